//! Serializable prop bags read by the domain engine and containers.

use serde::{Deserialize, Serialize};

use crate::core::scale::ScaleKind;
use crate::core::types::{Axis, Domain, Point, Value};

/// A setting that applies to both axes or is given per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerAxis<T> {
    Both(T),
    Axes { x: Option<T>, y: Option<T> },
}

impl<T: Clone> PerAxis<T> {
    #[must_use]
    pub fn get(&self, axis: Axis) -> Option<T> {
        match self {
            Self::Both(value) => Some(value.clone()),
            Self::Axes { x, y } => match axis {
                Axis::X => x.clone(),
                Axis::Y => y.clone(),
            },
        }
    }

    #[must_use]
    pub fn only(axis: Axis, value: T) -> Self {
        match axis {
            Axis::X => Self::Axes {
                x: Some(value),
                y: None,
            },
            Axis::Y => Self::Axes {
                x: None,
                y: Some(value),
            },
        }
    }

    /// Replaces the value for one axis, keeping the other axis as it was.
    #[must_use]
    pub fn with(self, axis: Axis, value: T) -> Self {
        let other = self.get(axis.other());
        match axis {
            Axis::X => Self::Axes {
                x: Some(value),
                y: other,
            },
            Axis::Y => Self::Axes {
                x: other,
                y: Some(value),
            },
        }
    }
}

fn set_axis<T: Clone>(slot: &mut Option<PerAxis<T>>, axis: Axis, value: T) {
    *slot = Some(match slot.take() {
        Some(current) => current.with(axis, value),
        None => PerAxis::only(axis, value),
    });
}

/// Pixel padding amount: uniform or `[left, right]` (`[bottom, top]` on y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaddingAmount {
    Uniform(f64),
    Pair([f64; 2]),
}

impl PaddingAmount {
    #[must_use]
    pub fn sides(self) -> (f64, f64) {
        match self {
            Self::Uniform(value) => (value, value),
            Self::Pair([left, right]) => (left, right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Padding {
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

/// Axis-aligned pixel box. Corners are not required to be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl PixelBox {
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[must_use]
    pub fn min_x(self) -> f64 {
        self.x1.min(self.x2)
    }

    #[must_use]
    pub fn max_x(self) -> f64 {
        self.x1.max(self.x2)
    }

    #[must_use]
    pub fn min_y(self) -> f64 {
        self.y1.min(self.y2)
    }

    #[must_use]
    pub fn max_y(self) -> f64 {
        self.y1.max(self.y2)
    }

    #[must_use]
    pub fn width(self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    #[must_use]
    pub fn height(self) -> f64 {
        (self.y2 - self.y1).abs()
    }

    /// Containment test, widened by half of `tolerance` on every side.
    #[must_use]
    pub fn contains(self, point: Point, tolerance: f64) -> bool {
        let pad = tolerance / 2.0;
        point.x + pad >= self.min_x()
            && point.x - pad <= self.max_x()
            && point.y + pad >= self.min_y()
            && point.y - pad <= self.max_y()
    }
}

/// Chart surface geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default)]
    pub horizontal: bool,
    #[serde(default)]
    pub polar: bool,
    /// Degrees.
    #[serde(default)]
    pub start_angle: f64,
    /// Degrees.
    #[serde(default = "default_end_angle")]
    pub end_angle: f64,
    #[serde(default)]
    pub inner_radius: f64,
}

fn default_width() -> f64 {
    450.0
}

fn default_height() -> f64 {
    300.0
}

fn default_end_angle() -> f64 {
    360.0
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            padding: Padding::default(),
            horizontal: false,
            polar: false,
            start_angle: 0.0,
            end_angle: default_end_angle(),
            inner_radius: 0.0,
        }
    }
}

impl ChartLayout {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    #[must_use]
    pub fn with_polar(mut self, start_angle: f64, end_angle: f64) -> Self {
        self.polar = true;
        self.start_angle = start_angle;
        self.end_angle = end_angle;
        self
    }

    /// Pixel range for a screen axis.
    ///
    /// Cartesian y runs bottom-up. Polar x is the angular span in radians and
    /// polar y runs from the inner radius to the outer radius.
    #[must_use]
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        if self.polar {
            return match axis {
                Axis::X => (self.start_angle.to_radians(), self.end_angle.to_radians()),
                Axis::Y => (self.inner_radius, self.radius()),
            };
        }
        match axis {
            Axis::X => (self.padding.left, self.width - self.padding.right),
            Axis::Y => (self.height - self.padding.bottom, self.padding.top),
        }
    }

    /// Range used for a data axis, accounting for horizontal orientation.
    #[must_use]
    pub fn data_range(&self, axis: Axis) -> (f64, f64) {
        self.range(axis.current(self.horizontal))
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        let plot = self.plot_bounds();
        (plot.width().min(plot.height()) / 2.0).max(0.0)
    }

    /// Center of the plotting area (polar origin).
    #[must_use]
    pub fn origin(&self) -> Point {
        let plot = self.plot_bounds();
        Point::new(
            plot.min_x() + plot.width() / 2.0,
            plot.min_y() + plot.height() / 2.0,
        )
    }

    /// Padded plotting rectangle.
    #[must_use]
    pub fn plot_bounds(&self) -> PixelBox {
        PixelBox::new(
            self.padding.left,
            self.padding.top,
            self.width - self.padding.right,
            self.height - self.padding.bottom,
        )
    }

    #[must_use]
    pub fn is_full_circle(&self) -> bool {
        self.polar && ((self.end_angle - self.start_angle).abs() - 360.0).abs() < f64::EPSILON
    }
}

/// Props that influence domain computation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainProps {
    #[serde(default)]
    pub domain: Option<PerAxis<Domain>>,
    #[serde(default)]
    pub min_domain: Option<PerAxis<Value>>,
    #[serde(default)]
    pub max_domain: Option<PerAxis<Value>>,
    #[serde(default)]
    pub domain_padding: Option<PerAxis<PaddingAmount>>,
    /// `None` means enabled.
    #[serde(default)]
    pub single_quadrant_domain_padding: Option<PerAxis<bool>>,
    #[serde(default)]
    pub scale: Option<PerAxis<ScaleKind>>,
    #[serde(default)]
    pub categories: Option<PerAxis<Vec<String>>>,
    #[serde(default)]
    pub layout: ChartLayout,
}

impl DomainProps {
    #[must_use]
    pub fn new(layout: ChartLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(PerAxis::Both(domain));
        self
    }

    #[must_use]
    pub fn with_axis_domain(mut self, axis: Axis, domain: Domain) -> Self {
        set_axis(&mut self.domain, axis, domain);
        self
    }

    #[must_use]
    pub fn with_min_domain(mut self, axis: Axis, value: impl Into<Value>) -> Self {
        set_axis(&mut self.min_domain, axis, value.into());
        self
    }

    #[must_use]
    pub fn with_max_domain(mut self, axis: Axis, value: impl Into<Value>) -> Self {
        set_axis(&mut self.max_domain, axis, value.into());
        self
    }

    #[must_use]
    pub fn with_domain_padding(mut self, padding: f64) -> Self {
        self.domain_padding = Some(PerAxis::Both(PaddingAmount::Uniform(padding)));
        self
    }

    #[must_use]
    pub fn with_axis_domain_padding(mut self, axis: Axis, padding: PaddingAmount) -> Self {
        set_axis(&mut self.domain_padding, axis, padding);
        self
    }

    #[must_use]
    pub fn with_single_quadrant_domain_padding(mut self, enabled: bool) -> Self {
        self.single_quadrant_domain_padding = Some(PerAxis::Both(enabled));
        self
    }

    #[must_use]
    pub fn with_scale(mut self, axis: Axis, kind: ScaleKind) -> Self {
        set_axis(&mut self.scale, axis, kind);
        self
    }

    #[must_use]
    pub fn with_categories(mut self, axis: Axis, categories: Vec<String>) -> Self {
        set_axis(&mut self.categories, axis, categories);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: ChartLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn explicit_domain(&self, axis: Axis) -> Option<Domain> {
        self.domain.as_ref().and_then(|domain| domain.get(axis))
    }

    #[must_use]
    pub fn min_domain(&self, axis: Axis) -> Option<Value> {
        self.min_domain.as_ref().and_then(|value| value.get(axis))
    }

    #[must_use]
    pub fn max_domain(&self, axis: Axis) -> Option<Value> {
        self.max_domain.as_ref().and_then(|value| value.get(axis))
    }

    /// `(left, right)` padding in pixels, `None` when unset.
    #[must_use]
    pub fn domain_padding(&self, axis: Axis) -> Option<(f64, f64)> {
        self.domain_padding
            .as_ref()
            .and_then(|padding| padding.get(axis))
            .map(PaddingAmount::sides)
    }

    #[must_use]
    pub fn single_quadrant(&self, axis: Axis) -> bool {
        self.single_quadrant_domain_padding
            .as_ref()
            .and_then(|value| value.get(axis))
            .unwrap_or(true)
    }

    #[must_use]
    pub fn scale_kind(&self, axis: Axis) -> ScaleKind {
        self.scale
            .as_ref()
            .and_then(|kind| kind.get(axis))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn categories(&self, axis: Axis) -> Option<Vec<String>> {
        self.categories
            .as_ref()
            .and_then(|categories| categories.get(axis))
            .filter(|categories| !categories.is_empty())
    }

    /// Copies the settings a parent always forces onto its children
    /// (orientation, polar geometry, categories, min/max bounds).
    #[must_use]
    pub fn inherit_from(&self, parent: &Self) -> Self {
        let mut merged = self.clone();
        merged.layout = parent.layout;
        if parent.categories.is_some() {
            merged.categories = parent.categories.clone();
        }
        if parent.min_domain.is_some() {
            merged.min_domain = parent.min_domain.clone();
        }
        if parent.max_domain.is_some() {
            merged.max_domain = parent.max_domain.clone();
        }
        if merged.scale.is_none() {
            merged.scale = parent.scale.clone();
        }
        merged
    }
}
