//! Sign-consistent stacking of series that share x categories.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::types::{Axis, Datum, Value};

pub use crate::core::domain::get_domain_from_grouped_data;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackOptions {
    /// Align every series to the union of x values, inserting `y = 0` gaps.
    #[serde(default = "default_fill_in_missing_data")]
    pub fill_in_missing_data: bool,
    /// Added to each datum's `x` to produce `x1`.
    #[serde(default)]
    pub x_offset: f64,
}

fn default_fill_in_missing_data() -> bool {
    true
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            fill_in_missing_data: default_fill_in_missing_data(),
            x_offset: 0.0,
        }
    }
}

impl StackOptions {
    #[must_use]
    pub fn with_fill_in_missing_data(mut self, fill: bool) -> Self {
        self.fill_in_missing_data = fill;
        self
    }

    #[must_use]
    pub fn with_x_offset(mut self, x_offset: f64) -> Self {
        self.x_offset = x_offset;
        self
    }
}

/// Aligns every series to the sorted union of x values.
///
/// Missing positions receive a `y = 0` datum. With `fill_in_missing` unset the
/// datasets are returned as given.
#[must_use]
pub fn fill_data(datasets: &[Vec<Datum>], fill_in_missing: bool) -> Vec<Vec<Datum>> {
    if !fill_in_missing {
        return datasets.to_vec();
    }
    let xs: BTreeSet<OrderedFloat<f64>> = datasets
        .iter()
        .flatten()
        .map(|datum| OrderedFloat(datum.get(Axis::X)))
        .collect();

    datasets
        .iter()
        .map(|dataset| {
            let temporal = dataset.iter().any(|datum| datum.x.is_date());
            let present: BTreeSet<OrderedFloat<f64>> = dataset
                .iter()
                .map(|datum| OrderedFloat(datum.get(Axis::X)))
                .collect();
            let mut filled = dataset.clone();
            // Gap data get event keys past the end of the real ones.
            filled.extend(xs.difference(&present).enumerate().map(|(offset, x)| {
                Datum::at(Value::from_f64(x.0, temporal), Value::Number(0.0))
                    .with_event_key(dataset.len() + offset)
            }));
            filled.sort_by_key(|datum| OrderedFloat(datum.get(Axis::X)));
            filled
        })
        .collect()
}

/// Stacks series bottom-to-top in input order.
///
/// Each datum gets `y0` (the sum of same-signed `y` values of earlier series
/// at the same x, starting from the first series' baseline), `y1 = y + y0`
/// and `x1 = x + x_offset`. A datum that already carries `y0` keeps it.
#[must_use]
pub fn compute_stacked_layout(datasets: &[Vec<Datum>], options: StackOptions) -> Vec<Vec<Datum>> {
    let filled = fill_data(datasets, options.fill_in_missing_data);

    let baselines: IndexMap<OrderedFloat<f64>, f64> = filled
        .first()
        .map(|first| {
            first
                .iter()
                .filter_map(|datum| Some((OrderedFloat(datum.get(Axis::X)), datum.y0?)))
                .collect()
        })
        .unwrap_or_default();

    // (positive total, negative total) per x.
    let mut totals: IndexMap<OrderedFloat<f64>, (f64, f64)> = IndexMap::new();
    let stacked: Vec<Vec<Datum>> = filled
        .into_iter()
        .map(|dataset| {
            dataset
                .into_iter()
                .map(|mut datum| {
                    let x = datum.get(Axis::X);
                    let y = datum.get(Axis::Y);
                    let key = OrderedFloat(x);
                    let baseline = baselines.get(&key).copied().unwrap_or(0.0);
                    let entry = totals.entry(key).or_insert((baseline, baseline));
                    let offset = if y >= 0.0 { entry.0 } else { entry.1 };
                    let y0 = datum.y0.unwrap_or(offset);
                    if y >= 0.0 {
                        entry.0 += y;
                    } else {
                        entry.1 += y;
                    }
                    datum.y0 = Some(y0);
                    datum.y1 = Some(y + y0);
                    datum.x1 = Some(x + options.x_offset);
                    datum
                })
                .collect()
        })
        .collect();
    trace!(
        series = stacked.len(),
        categories = totals.len(),
        "computed stacked layout"
    );
    stacked
}
