use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Half-width used to widen a single-point numeric domain.
pub const NUMERIC_EPSILON: f64 = 1e-10;
/// Half-width (milliseconds) used to widen a single-point date domain.
pub const DATE_EPSILON_MS: f64 = 1.0;
/// Largest integer exactly representable as `f64`.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
/// `1 / MAX_SAFE_INTEGER`; stands in for zero on log axes and for "just clicked" brushes.
pub const SMALL_NUMBER: f64 = 1.0 / MAX_SAFE_INTEGER;

/// Chart axis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Axis that is drawn along the screen axis `self` when the chart is horizontal.
    #[must_use]
    pub fn current(self, horizontal: bool) -> Self {
        if horizontal { self.other() } else { self }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

/// Raw data value: a number or a UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Date(DateTime<Utc>),
}

impl Value {
    /// Numeric view of the value; dates map to epoch milliseconds.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Number(value) => value,
            Self::Date(date) => date.timestamp_millis() as f64,
        }
    }

    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Re-boxes a numeric value, producing a date when `temporal` is set and
    /// the value is a representable timestamp.
    #[must_use]
    pub fn from_f64(value: f64, temporal: bool) -> Self {
        if !temporal {
            return Self::Number(value);
        }
        match Utc.timestamp_millis_opt(value.round() as i64).single() {
            Some(date) => Self::Date(date),
            None => Self::Number(value),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// Data-space interval.
///
/// `start`/`end` are kept in the order they were given so explicit domains
/// are honored verbatim; `min()`/`max()` always satisfy `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub temporal: bool,
}

impl Domain {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            temporal: false,
        }
    }

    #[must_use]
    pub fn temporal(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            temporal: true,
        }
    }

    #[must_use]
    pub fn from_values(start: Value, end: Value) -> Self {
        Self {
            start: start.as_f64(),
            end: end.as_f64(),
            temporal: start.is_date() || end.is_date(),
        }
    }

    /// Neutral domain used when nothing reports an extent.
    #[must_use]
    pub fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    #[must_use]
    pub fn with_temporal(mut self, temporal: bool) -> Self {
        self.temporal = temporal;
        self
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.start.min(self.end)
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.start.max(self.end)
    }

    #[must_use]
    pub fn span(self) -> f64 {
        (self.end - self.start).abs()
    }

    #[must_use]
    pub fn sorted(self) -> Self {
        Self {
            start: self.min(),
            end: self.max(),
            temporal: self.temporal,
        }
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min() && value <= self.max()
    }

    #[must_use]
    pub fn values(self) -> (Value, Value) {
        (
            Value::from_f64(self.start, self.temporal),
            Value::from_f64(self.end, self.temporal),
        )
    }

    /// Equality on bounds only, with a relative tolerance for values that
    /// went through a pixel round trip.
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        let tolerance = 1e-9 * self.span().max(other.span()).max(1.0);
        (self.min() - other.min()).abs() <= tolerance
            && (self.max() - other.max()).abs() <= tolerance
    }
}

/// Per-axis domains of a two-dimensional chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBox {
    pub x: Domain,
    pub y: Domain,
}

impl DomainBox {
    #[must_use]
    pub fn new(x: Domain, y: Domain) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn get(&self, axis: Axis) -> Domain {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn set(&mut self, axis: Axis, domain: Domain) {
        match axis {
            Axis::X => self.x = domain,
            Axis::Y => self.y = domain,
        }
    }

    #[must_use]
    pub fn with(mut self, axis: Axis, domain: Domain) -> Self {
        self.set(axis, domain);
        self
    }

    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.x.approx_eq(other.x) && self.y.approx_eq(other.y)
    }
}

/// Pixel-space point in the rendering surface's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn get(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

/// Error magnitude: symmetric scalar or `[positive, negative]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorValue {
    Symmetric(f64),
    Pair([f64; 2]),
}

impl ErrorValue {
    /// Builds an error value, coercing negative or non-finite magnitudes to zero.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let clean = |value: f64| if value.is_finite() && value > 0.0 { value } else { 0.0 };
        match self {
            Self::Symmetric(value) => Self::Symmetric(clean(value)),
            Self::Pair([positive, negative]) => Self::Pair([clean(positive), clean(negative)]),
        }
    }

    #[must_use]
    pub fn positive(self) -> f64 {
        match self.sanitized() {
            Self::Symmetric(value) => value,
            Self::Pair([positive, _]) => positive,
        }
    }

    #[must_use]
    pub fn negative(self) -> f64 {
        match self.sanitized() {
            Self::Symmetric(value) => value,
            Self::Pair([_, negative]) => negative,
        }
    }
}

/// Open/high/low/close quadruple for candlestick data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlc {
    #[must_use]
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }
}

/// A formatted datum.
///
/// `x0`/`x1`/`y0`/`y1` are optional extent fields: when present, domain
/// computation takes the appropriate bound instead of the plain value, and
/// voronoi hit-testing uses the extent midpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    pub x: Value,
    pub y: Value,
    #[serde(default)]
    pub x0: Option<f64>,
    #[serde(default)]
    pub x1: Option<f64>,
    #[serde(default)]
    pub y0: Option<f64>,
    #[serde(default)]
    pub y1: Option<f64>,
    /// Category name when `x` was mapped from a string.
    #[serde(default)]
    pub x_name: Option<String>,
    #[serde(default)]
    pub ohlc: Option<Ohlc>,
    #[serde(default)]
    pub error_x: Option<ErrorValue>,
    #[serde(default)]
    pub error_y: Option<ErrorValue>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub event_key: usize,
}

impl Datum {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self::at(Value::Number(x), Value::Number(y))
    }

    #[must_use]
    pub fn at(x: Value, y: Value) -> Self {
        Self {
            x,
            y,
            x0: None,
            x1: None,
            y0: None,
            y1: None,
            x_name: None,
            ohlc: None,
            error_x: None,
            error_y: None,
            label: None,
            event_key: 0,
        }
    }

    #[must_use]
    pub fn with_event_key(mut self, event_key: usize) -> Self {
        self.event_key = event_key;
        self
    }

    #[must_use]
    pub fn with_y0(mut self, y0: f64) -> Self {
        self.y0 = Some(y0);
        self
    }

    #[must_use]
    pub fn with_x_extent(mut self, x0: f64, x1: f64) -> Self {
        self.x0 = Some(x0);
        self.x1 = Some(x1);
        self
    }

    #[must_use]
    pub fn with_x_name(mut self, name: impl Into<String>) -> Self {
        self.x_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_ohlc(mut self, ohlc: Ohlc) -> Self {
        self.ohlc = Some(ohlc);
        self
    }

    #[must_use]
    pub fn with_errors(mut self, error_x: Option<ErrorValue>, error_y: Option<ErrorValue>) -> Self {
        self.error_x = error_x.map(ErrorValue::sanitized);
        self.error_y = error_y.map(ErrorValue::sanitized);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn value(&self, axis: Axis) -> Value {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    #[must_use]
    pub fn get(&self, axis: Axis) -> f64 {
        self.value(axis).as_f64()
    }

    /// Lower/upper extent fields for `axis`, falling back to the plain value.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> (f64, f64) {
        let value = self.get(axis);
        let (low, high) = match axis {
            Axis::X => (self.x0, self.x1),
            Axis::Y => (self.y0, self.y1),
        };
        (low.unwrap_or(value), high.unwrap_or(value))
    }

    /// Point used for voronoi hit-testing: midpoint of the extent fields.
    #[must_use]
    pub fn midpoint(&self, axis: Axis) -> f64 {
        let (low, high) = self.extent(axis);
        (low + high) / 2.0
    }
}
