//! Domain computation: explicit props, categories, data extents, padding and
//! log-axis correction.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::core::collection::{max_f64, min_f64};
use crate::core::props::DomainProps;
use crate::core::types::{
    Axis, DATE_EPSILON_MS, Datum, Domain, NUMERIC_EPSILON, SMALL_NUMBER, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

/// Builds a domain from bounds, widening a single-point domain.
///
/// A single value `v` becomes `[v - eps, v + eps]`; zero becomes `[0, 2 * eps]`.
/// `eps` is `1e-10` for numbers and one millisecond for dates.
#[must_use]
pub fn get_domain_from_min_max(min: f64, max: f64, temporal: bool) -> Domain {
    if min != max {
        return Domain {
            start: min,
            end: max,
            temporal,
        };
    }
    let value = max;
    let epsilon = if temporal {
        DATE_EPSILON_MS
    } else {
        NUMERIC_EPSILON
    };
    if value == 0.0 {
        Domain {
            start: 0.0,
            end: 2.0 * epsilon,
            temporal,
        }
    } else {
        Domain {
            start: value - epsilon,
            end: value + epsilon,
            temporal,
        }
    }
}

fn bound_value(value: Option<Value>) -> Option<(f64, bool)> {
    value.map(|value| (value.as_f64(), value.is_date()))
}

/// Explicit domain for `axis`: a full domain prop, or both min and max bounds.
#[must_use]
pub fn get_domain_from_props(props: &DomainProps, axis: Axis) -> Option<Domain> {
    if let Some(domain) = props.explicit_domain(axis) {
        return Some(domain);
    }
    match (
        bound_value(props.min_domain(axis)),
        bound_value(props.max_domain(axis)),
    ) {
        (Some((min, min_date)), Some((max, max_date))) => {
            Some(get_domain_from_min_max(min, max, min_date || max_date))
        }
        _ => None,
    }
}

/// Extreme of `data` on `axis`, honoring `x0/x1` (`y0/y1`) extent fields.
///
/// Returns the value and whether any contributing datum is a date.
#[must_use]
pub fn get_extreme_from_data(data: &[Datum], axis: Axis, extreme: Extreme) -> Option<(f64, bool)> {
    let contains_date = data.iter().any(|datum| datum.value(axis).is_date());
    let values = data.iter().map(|datum| {
        let (low, high) = datum.extent(axis);
        match extreme {
            Extreme::Min => low.min(high),
            Extreme::Max => low.max(high),
        }
    });
    let value = match extreme {
        Extreme::Min => min_f64(values),
        Extreme::Max => max_f64(values),
    }?;
    Some((value, contains_date))
}

/// Extends a full-circle angular domain by one step so the first and last
/// categories do not overlap.
#[must_use]
pub fn get_symmetric_domain(domain: Domain, values: &[f64]) -> Domain {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by_key(|value| OrderedFloat(*value));
    sorted.dedup();
    match sorted.as_slice() {
        [first, second, ..] => Domain {
            start: domain.start,
            end: domain.end + (second - first),
            temporal: domain.temporal,
        },
        _ => domain,
    }
}

fn closes_circle(props: &DomainProps, axis: Axis) -> bool {
    axis == Axis::X && props.layout.is_full_circle()
}

/// Domain of raw data, or `None` for an empty dataset without min/max props.
#[must_use]
pub fn get_domain_from_data(props: &DomainProps, axis: Axis, data: &[Datum]) -> Option<Domain> {
    let min_prop = bound_value(props.min_domain(axis));
    let max_prop = bound_value(props.max_domain(axis));
    if data.is_empty() {
        return match (min_prop, max_prop) {
            (Some((min, min_date)), Some((max, max_date))) => {
                Some(get_domain_from_min_max(min, max, min_date || max_date))
            }
            _ => None,
        };
    }

    let (min, min_date) = match min_prop {
        Some(bound) => bound,
        None => get_extreme_from_data(data, axis, Extreme::Min)?,
    };
    let (max, max_date) = match max_prop {
        Some(bound) => bound,
        None => get_extreme_from_data(data, axis, Extreme::Max)?,
    };
    let domain = get_domain_from_min_max(min, max, min_date || max_date);
    if closes_circle(props, axis) {
        let values: Vec<f64> = data.iter().map(|datum| datum.get(axis)).collect();
        return Some(get_symmetric_domain(domain, &values));
    }
    Some(domain)
}

/// Domain of categorical positions (1-based, first-seen order).
#[must_use]
pub fn get_domain_from_categories(
    props: &DomainProps,
    axis: Axis,
    categories: &[String],
) -> Option<Domain> {
    if categories.is_empty() {
        return None;
    }
    let positions: IndexMap<&str, usize> = categories
        .iter()
        .fold(IndexMap::new(), |mut memo, category| {
            let next = memo.len() + 1;
            memo.entry(category.as_str()).or_insert(next);
            memo
        });
    let values: Vec<f64> = positions.values().map(|position| *position as f64).collect();
    let min = bound_value(props.min_domain(axis))
        .map(|(value, _)| value)
        .or_else(|| min_f64(values.iter().copied()))?;
    let max = bound_value(props.max_domain(axis))
        .map(|(value, _)| value)
        .or_else(|| max_f64(values.iter().copied()))?;
    let domain = get_domain_from_min_max(min, max, false);
    if closes_circle(props, axis) {
        return Some(get_symmetric_domain(domain, &values));
    }
    Some(domain)
}

/// `(left, right)` padding in pixels for `axis`.
#[must_use]
pub fn get_domain_padding(props: &DomainProps, axis: Axis) -> (f64, f64) {
    props.domain_padding(axis).unwrap_or((0.0, 0.0))
}

/// Pads a domain by pixel amounts, proportionally to the axis range.
///
/// Padding is computed twice: once naively, then again against the adjusted
/// span. Unless single-quadrant padding is disabled, a padded bound that
/// would cross zero is clamped to exactly zero. Explicit min/max props always
/// override the padded bound on their side.
#[must_use]
pub fn pad_domain(domain: Domain, props: &DomainProps, axis: Axis) -> Domain {
    if props.domain_padding.is_none() {
        return domain;
    }
    let (pad_left, pad_right) = get_domain_padding(props, axis);
    if pad_left == 0.0 && pad_right == 0.0 {
        return domain;
    }

    let min = domain.min();
    let max = domain.max();
    let (range_start, range_end) = props.layout.data_range(axis);
    let range_extent = (range_start - range_end).abs();
    if range_extent == 0.0 || !range_extent.is_finite() {
        return domain;
    }
    let padded_range_extent = (range_extent - pad_left - pad_right).max(1.0);
    let padded_domain_extent = (max - min).abs() / padded_range_extent * range_extent;
    let mut padded = (
        min - padded_domain_extent * pad_left / range_extent,
        max + padded_domain_extent * pad_right / range_extent,
    );

    let adds_quadrants = (min >= 0.0 && padded.0 <= 0.0) || (max <= 0.0 && padded.1 >= 0.0);
    if adds_quadrants && props.single_quadrant(axis) {
        let adjust_min = |value: f64| if min >= 0.0 && value <= 0.0 { 0.0 } else { value };
        let adjust_max = |value: f64| if max <= 0.0 && value >= 0.0 { 0.0 } else { value };

        let span = (max - min).abs();
        let adjusted = (
            adjust_min(min - span * pad_left / range_extent),
            adjust_max(max + span * pad_right / range_extent),
        );
        let adjusted_span = (adjusted.1 - adjusted.0).abs();
        padded = (
            adjust_min(min - adjusted_span * pad_left / range_extent),
            adjust_max(max + adjusted_span * pad_right / range_extent),
        );
        debug!(
            axis = axis.as_str(),
            min = padded.0,
            max = padded.1,
            "clamped domain padding at zero"
        );
    }

    let final_min = bound_value(props.min_domain(axis)).map_or(padded.0, |(value, _)| value);
    let final_max = bound_value(props.max_domain(axis)).map_or(padded.1, |(value, _)| value);
    get_domain_from_min_max(final_min, final_max, domain.temporal)
}

/// Replaces zero endpoints of a log-axis domain with `±1/MAX_SAFE_INTEGER`.
///
/// The substitute is negative when either bound is negative, so descending
/// domains such as `[0, -5]` stay on one side of zero.
#[must_use]
pub fn clean_domain(domain: Domain, props: &DomainProps, axis: Axis) -> Domain {
    if !props.scale_kind(axis).is_log() {
        return domain;
    }
    let almost_zero = if domain.start < 0.0 || domain.end < 0.0 {
        -SMALL_NUMBER
    } else {
        SMALL_NUMBER
    };
    let replace = |value: f64| if value == 0.0 { almost_zero } else { value };
    let cleaned = Domain {
        start: replace(domain.start),
        end: replace(domain.end),
        temporal: domain.temporal,
    };
    if cleaned != domain {
        trace!(axis = axis.as_str(), ?cleaned, "corrected log domain endpoint");
    }
    cleaned
}

#[must_use]
pub fn format_domain(domain: Domain, props: &DomainProps, axis: Axis) -> Domain {
    clean_domain(pad_domain(domain, props, axis), props, axis)
}

/// Shared skeleton: explicit props win, then categories, then `from_data`.
fn create_domain<D, F>(props: &DomainProps, axis: Axis, from_data: D, format: F) -> Option<Domain>
where
    D: FnOnce() -> Option<Domain>,
    F: Fn(Domain) -> Domain,
{
    if let Some(domain) = get_domain_from_props(props, axis) {
        return Some(format(domain));
    }
    let domain = match props.categories(axis) {
        Some(categories) => get_domain_from_categories(props, axis, &categories),
        None => from_data(),
    };
    domain.map(format)
}

/// Padded and cleaned domain of a single dataset.
#[must_use]
pub fn get_domain(props: &DomainProps, axis: Axis, data: &[Datum]) -> Option<Domain> {
    create_domain(
        props,
        axis,
        || get_domain_from_data(props, axis, data),
        |domain| format_domain(domain, props, axis),
    )
}

/// Zero-inclusive variant used by bar- and area-like series.
///
/// The dependent axis is extended to include the lowest `y0` baseline (or
/// zero when no datum carries one). Explicit domain props are only formatted.
#[must_use]
pub fn get_domain_with_zero(props: &DomainProps, axis: Axis, data: &[Datum]) -> Option<Domain> {
    if let Some(domain) = get_domain_from_props(props, axis) {
        return Some(format_domain(domain, props, axis));
    }
    let baseline = min_f64(data.iter().filter_map(|datum| datum.y0)).unwrap_or(0.0);
    let ensure_zero = |domain: Domain| {
        if axis == Axis::X {
            return domain;
        }
        let max = bound_value(props.max_domain(axis))
            .map_or(domain.max().max(baseline), |(value, _)| value);
        let min = bound_value(props.min_domain(axis))
            .map_or(domain.min().min(baseline), |(value, _)| value);
        get_domain_from_min_max(min, max, domain.temporal)
    };
    create_domain(
        props,
        axis,
        || get_domain_from_data(props, axis, data),
        |domain| format_domain(ensure_zero(domain), props, axis),
    )
}

/// Domain of a stacked collection.
///
/// The independent axis (x) is the extent of the unioned raw data. The
/// dependent axis (y) also covers the per-category cumulative sums, summed
/// separately for positive and negative values.
#[must_use]
pub fn get_domain_from_grouped_data(
    props: &DomainProps,
    axis: Axis,
    datasets: &[Vec<Datum>],
) -> Option<Domain> {
    if let Some(domain) = get_domain_from_props(props, axis) {
        return Some(format_domain(domain, props, axis));
    }
    let flat: Vec<Datum> = datasets.iter().flatten().cloned().collect();
    let global = get_domain_from_data(props, axis, &flat)?;
    if axis == Axis::X {
        return Some(format_domain(global, props, axis));
    }

    let mut sums: IndexMap<OrderedFloat<f64>, (f64, f64)> = IndexMap::new();
    for datum in &flat {
        let y = datum.get(Axis::Y);
        let entry = sums
            .entry(OrderedFloat(datum.get(Axis::X)))
            .or_insert((0.0, 0.0));
        if y > 0.0 {
            entry.0 += y;
        } else if y < 0.0 {
            entry.1 += y;
        }
    }
    let cumulative_max = max_f64(sums.values().map(|(positive, _)| *positive)).unwrap_or(0.0);
    let cumulative_min = min_f64(sums.values().map(|(_, negative)| *negative)).unwrap_or(0.0);

    let min = bound_value(props.min_domain(axis))
        .map_or(global.min().min(cumulative_min), |(value, _)| value);
    let max = bound_value(props.max_domain(axis))
        .map_or(global.max().max(cumulative_max), |(value, _)| value);
    Some(format_domain(
        get_domain_from_min_max(min, max, global.temporal),
        props,
        axis,
    ))
}
