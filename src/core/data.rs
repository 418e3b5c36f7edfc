//! Turns raw JSON records into [`Datum`]s through configurable accessors.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::core::collection::uniq;
use crate::core::types::{Axis, Datum, ErrorValue, Ohlc, Value};
use crate::error::{ChartError, ChartResult};

/// Field accessor: array index or dot-separated key path (`"stats.mean"`,
/// `"points.0"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Accessor {
    Index(usize),
    Key(String),
}

impl Accessor {
    #[must_use]
    pub fn key(path: impl Into<String>) -> Self {
        Self::Key(path.into())
    }

    fn validate(&self) -> ChartResult<()> {
        if let Self::Key(path) = self
            && (path.is_empty() || path.split('.').any(str::is_empty))
        {
            return Err(ChartError::InvalidData(format!(
                "accessor path `{path}` has an empty segment"
            )));
        }
        Ok(())
    }

    /// Resolves the accessor against a record; `None` when absent or null.
    #[must_use]
    pub fn resolve<'a>(&self, record: &'a JsonValue) -> Option<&'a JsonValue> {
        let found = match self {
            Self::Index(index) => record.get(*index),
            Self::Key(path) => path.split('.').try_fold(record, |current, segment| {
                match (current, segment.parse::<usize>()) {
                    (JsonValue::Array(items), Ok(index)) => items.get(index),
                    _ => current.get(segment),
                }
            }),
        };
        found.filter(|value| !value.is_null())
    }
}

/// Direction used when sorting formatted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAccessors {
    #[serde(default = "default_x")]
    pub x: Option<Accessor>,
    #[serde(default = "default_y")]
    pub y: Accessor,
    #[serde(default)]
    pub y0: Option<Accessor>,
    #[serde(default)]
    pub error_x: Option<Accessor>,
    #[serde(default)]
    pub error_y: Option<Accessor>,
    #[serde(default)]
    pub open: Option<Accessor>,
    #[serde(default)]
    pub high: Option<Accessor>,
    #[serde(default)]
    pub low: Option<Accessor>,
    #[serde(default)]
    pub close: Option<Accessor>,
    #[serde(default)]
    pub label: Option<Accessor>,
    /// Parse string x values as RFC 3339 dates instead of categories.
    #[serde(default)]
    pub x_is_time: bool,
    #[serde(default)]
    pub sort_key: Option<Axis>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_x() -> Option<Accessor> {
    Some(Accessor::key("x"))
}

fn default_y() -> Accessor {
    Accessor::key("y")
}

impl Default for DataAccessors {
    fn default() -> Self {
        Self {
            x: default_x(),
            y: default_y(),
            y0: None,
            error_x: None,
            error_y: None,
            open: None,
            high: None,
            low: None,
            close: None,
            label: None,
            x_is_time: false,
            sort_key: None,
            sort_order: SortOrder::Ascending,
        }
    }
}

impl DataAccessors {
    /// Accessors for candlestick records keyed `x/open/high/low/close`; `y`
    /// reads `close`.
    #[must_use]
    pub fn candlestick() -> Self {
        Self {
            y: Accessor::key("close"),
            open: Some(Accessor::key("open")),
            high: Some(Accessor::key("high")),
            low: Some(Accessor::key("low")),
            close: Some(Accessor::key("close")),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_errors(mut self, error_x: Option<Accessor>, error_y: Option<Accessor>) -> Self {
        self.error_x = error_x;
        self.error_y = error_y;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, key: Axis, order: SortOrder) -> Self {
        self.sort_key = Some(key);
        self.sort_order = order;
        self
    }

    fn accessor(&self, axis: Axis) -> Option<&Accessor> {
        match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => Some(&self.y),
        }
    }

    fn validate(&self) -> ChartResult<()> {
        [
            self.x.as_ref(),
            Some(&self.y),
            self.y0.as_ref(),
            self.error_x.as_ref(),
            self.error_y.as_ref(),
            self.open.as_ref(),
            self.high.as_ref(),
            self.low.as_ref(),
            self.close.as_ref(),
            self.label.as_ref(),
        ]
        .into_iter()
        .flatten()
        .try_for_each(Accessor::validate)
    }
}

/// String values found on `axis` in raw records, deduplicated, first-seen order.
#[must_use]
pub fn get_strings_from_data(
    records: &[JsonValue],
    accessors: &DataAccessors,
    axis: Axis,
) -> Vec<String> {
    if axis == Axis::X && accessors.x_is_time {
        return Vec::new();
    }
    let Some(accessor) = accessors.accessor(axis) else {
        return Vec::new();
    };
    uniq(
        records
            .iter()
            .filter_map(|record| accessor.resolve(record))
            .filter_map(|value| value.as_str().map(str::to_owned)),
    )
}

#[must_use]
pub fn get_strings_from_categories(categories: Option<&[String]>) -> Vec<String> {
    categories.map(|items| uniq(items.iter().cloned())).unwrap_or_default()
}

/// Maps each string to its 1-based first-seen position.
#[must_use]
pub fn create_string_map<I>(strings: I) -> IndexMap<String, usize>
where
    I: IntoIterator<Item = String>,
{
    uniq(strings)
        .into_iter()
        .enumerate()
        .map(|(index, value)| (value, index + 1))
        .collect()
}

fn json_number(value: Option<&JsonValue>) -> Option<f64> {
    value.and_then(JsonValue::as_f64).filter(|number| number.is_finite())
}

fn json_error(value: Option<&JsonValue>) -> ErrorValue {
    match value {
        Some(JsonValue::Array(items)) if items.len() == 2 => ErrorValue::Pair([
            items[0].as_f64().unwrap_or(0.0),
            items[1].as_f64().unwrap_or(0.0),
        ]),
        other => ErrorValue::Symmetric(json_number(other).unwrap_or(0.0)),
    }
    .sanitized()
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Formats raw records into data.
///
/// Strings on either axis become 1-based categorical positions (categories
/// first, then data order). A missing x falls back to the 1-based record
/// index. Records without a usable y are skipped. Negative or missing error
/// magnitudes are coerced to zero.
pub fn format_data(
    records: &[JsonValue],
    accessors: &DataAccessors,
    categories: Option<&[String]>,
) -> ChartResult<Vec<Datum>> {
    accessors.validate()?;

    let x_strings = create_string_map(
        get_strings_from_categories(categories)
            .into_iter()
            .chain(get_strings_from_data(records, accessors, Axis::X)),
    );
    let y_strings = create_string_map(get_strings_from_data(records, accessors, Axis::Y));

    let mut data: Vec<Datum> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            format_record(index, record, accessors, &x_strings, &y_strings)
        })
        .collect();

    if data.len() != records.len() {
        debug!(
            records = records.len(),
            formatted = data.len(),
            "skipped records without a resolvable y value"
        );
    }

    if let Some(axis) = accessors.sort_key {
        data.sort_by(|left, right| {
            let ordering = OrderedFloat(left.get(axis)).cmp(&OrderedFloat(right.get(axis)));
            match accessors.sort_order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }
    for (index, datum) in data.iter_mut().enumerate() {
        datum.event_key = index;
    }
    trace!(count = data.len(), "formatted data");
    Ok(data)
}

fn format_record(
    index: usize,
    record: &JsonValue,
    accessors: &DataAccessors,
    x_strings: &IndexMap<String, usize>,
    y_strings: &IndexMap<String, usize>,
) -> Option<Datum> {
    let raw_x = accessors.x.as_ref().and_then(|accessor| accessor.resolve(record));
    let mut x_name = None;
    let x = match raw_x {
        Some(JsonValue::String(text)) if accessors.x_is_time => Value::Date(parse_date(text)?),
        Some(JsonValue::String(text)) => {
            x_name = Some(text.clone());
            Value::Number(*x_strings.get(text)? as f64)
        }
        Some(other) => Value::Number(json_number(Some(other))?),
        None => Value::Number((index + 1) as f64),
    };

    let y = match accessors.y.resolve(record) {
        Some(JsonValue::String(text)) => Value::Number(*y_strings.get(text)? as f64),
        other => Value::Number(json_number(other)?),
    };

    let mut datum = Datum::at(x, y);
    datum.x_name = x_name;
    datum.y0 = accessors
        .y0
        .as_ref()
        .and_then(|accessor| json_number(accessor.resolve(record)));
    datum.error_x = accessors
        .error_x
        .as_ref()
        .map(|accessor| json_error(accessor.resolve(record)));
    datum.error_y = accessors
        .error_y
        .as_ref()
        .map(|accessor| json_error(accessor.resolve(record)));
    datum.label = accessors
        .label
        .as_ref()
        .and_then(|accessor| accessor.resolve(record))
        .map(|value| match value {
            JsonValue::String(text) => text.clone(),
            other => other.to_string(),
        });

    let ohlc_field = |accessor: &Option<Accessor>| {
        accessor
            .as_ref()
            .and_then(|accessor| json_number(accessor.resolve(record)))
    };
    if let (Some(open), Some(high), Some(low), Some(close)) = (
        ohlc_field(&accessors.open),
        ohlc_field(&accessors.high),
        ohlc_field(&accessors.low),
        ohlc_field(&accessors.close),
    ) {
        datum.ohlc = Some(Ohlc::new(open, high, low, close));
    }
    Some(datum)
}
