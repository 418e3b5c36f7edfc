//! Crosshair that follows the pointer in data space.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::plot::PlotContext;
use crate::core::types::{Axis, DomainBox, Point};
use crate::interaction::container::ContainerBehavior;
use crate::interaction::mutation::{Mutation, StateChange};
use crate::interaction::rate_limiter::{GestureSequence, RateLimiter};
use crate::interaction::{ContainerEvent, Gesture, PointerEvent, PointerSource};

pub const CURSOR_THROTTLE_MS: f64 = 32.0;

/// Cursor position in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorValue {
    pub x: f64,
    pub y: f64,
}

impl CursorValue {
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

    fn with(mut self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
        self
    }
}

/// Position shown while the pointer is outside the plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultCursorValue {
    /// Value on the cursor dimension; the other coordinate sits at the
    /// domain center.
    Value(f64),
    Point(CursorValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorProps {
    /// `None` draws both lines.
    #[serde(default)]
    pub cursor_dimension: Option<Axis>,
    #[serde(default)]
    pub default_cursor_value: Option<DefaultCursorValue>,
    #[serde(default = "default_label_offset")]
    pub cursor_label_offset: Point,
    /// Host-controlled position used until the pointer moves.
    #[serde(default)]
    pub cursor_value: Option<CursorValue>,
}

fn default_label_offset() -> Point {
    Point::new(5.0, -10.0)
}

impl Default for CursorProps {
    fn default() -> Self {
        Self {
            cursor_dimension: None,
            default_cursor_value: None,
            cursor_label_offset: default_label_offset(),
            cursor_value: None,
        }
    }
}

impl CursorProps {
    #[must_use]
    pub fn with_dimension(mut self, dimension: Axis) -> Self {
        self.cursor_dimension = Some(dimension);
        self
    }

    #[must_use]
    pub fn with_default_value(mut self, value: DefaultCursorValue) -> Self {
        self.default_cursor_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_label_offset(mut self, offset: Point) -> Self {
        self.cursor_label_offset = offset;
        self
    }

    #[must_use]
    pub fn with_cursor_value(mut self, value: CursorValue) -> Self {
        self.cursor_value = Some(value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorState {
    pub cursor_value: Option<CursorValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorLine {
    /// Data axis whose value the line marks.
    pub dimension: Axis,
    pub start: Point,
    pub end: Point,
}

/// Geometry of the rendered crosshair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorElements {
    pub value: CursorValue,
    pub position: Point,
    pub lines: Vec<CursorLine>,
    pub label_anchor: Point,
}

/// Resolves a default cursor value against `domain`.
#[must_use]
pub fn resolve_default(
    default: DefaultCursorValue,
    domain: &DomainBox,
    dimension: Option<Axis>,
) -> CursorValue {
    match default {
        DefaultCursorValue::Point(point) => point,
        DefaultCursorValue::Value(value) => {
            let center = CursorValue::new(
                (domain.x.start + domain.x.end) / 2.0,
                (domain.y.start + domain.y.end) / 2.0,
            );
            match dimension {
                Some(axis) => center.with(axis, value),
                None => center,
            }
        }
    }
}

type CursorCallback = Box<dyn FnMut(Option<CursorValue>)>;

pub struct CursorContainer {
    props: CursorProps,
    state: CursorState,
    limiter: RateLimiter,
    touches: GestureSequence,
    on_cursor_change: Option<CursorCallback>,
}

impl fmt::Debug for CursorContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorContainer")
            .field("props", &self.props)
            .field("state", &self.state)
            .field("touches", &self.touches)
            .finish_non_exhaustive()
    }
}

impl CursorContainer {
    #[must_use]
    pub fn new(props: CursorProps) -> Self {
        Self {
            state: CursorState {
                cursor_value: props.cursor_value,
            },
            props,
            limiter: RateLimiter::new(CURSOR_THROTTLE_MS),
            touches: GestureSequence::new(),
            on_cursor_change: None,
        }
    }

    /// Called with the new data position, or with the default position when
    /// the pointer leaves the domain.
    #[must_use]
    pub fn on_cursor_change(mut self, callback: impl FnMut(Option<CursorValue>) + 'static) -> Self {
        self.on_cursor_change = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn props(&self) -> &CursorProps {
        &self.props
    }

    #[must_use]
    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// Current position, falling back to the default cursor value.
    #[must_use]
    pub fn cursor_position(&self, ctx: &PlotContext<'_>) -> Option<CursorValue> {
        self.state.cursor_value.or_else(|| {
            self.props
                .default_cursor_value
                .map(|default| resolve_default(default, &ctx.domain, self.props.cursor_dimension))
        })
    }

    /// Crosshair lines clipped to the padded plot area, plus the label anchor.
    #[must_use]
    pub fn cursor_elements(&self, ctx: &PlotContext<'_>) -> Option<CursorElements> {
        let value = self.cursor_position(ctx)?;
        let layout = ctx.layout;
        let padding = layout.padding;
        let position = ctx.scale_point(value.x, value.y);
        let offset = self.props.cursor_label_offset;
        let dimension = self
            .props
            .cursor_dimension
            .map(|axis| axis.current(layout.horizontal));

        let mut lines = Vec::with_capacity(2);
        if dimension.is_none_or(|axis| axis == Axis::X) {
            lines.push(CursorLine {
                dimension: Axis::X.current(layout.horizontal),
                start: Point::new(position.x, padding.top),
                end: Point::new(position.x, layout.height - padding.bottom),
            });
        }
        if dimension.is_none_or(|axis| axis == Axis::Y) {
            lines.push(CursorLine {
                dimension: Axis::Y.current(layout.horizontal),
                start: Point::new(padding.left, position.y),
                end: Point::new(layout.width - padding.right, position.y),
            });
        }
        Some(CursorElements {
            value,
            position,
            lines,
            label_anchor: Point::new(position.x + offset.x, position.y + offset.y),
        })
    }

    pub fn pointer_move(&mut self, ctx: &PlotContext<'_>, event: &PointerEvent) -> Vec<Mutation> {
        if event.source == PointerSource::Touch && !self.touches.accept(event.sequence) {
            debug!(sequence = ?event.sequence, "ignored duplicate touch move");
            return Vec::new();
        }
        if !self.limiter.try_acquire(event.timestamp_ms) {
            trace!(timestamp_ms = event.timestamp_ms, "throttled cursor move");
            return Vec::new();
        }

        let (x, y) = ctx.data_coordinates(event.position);
        let in_bounds = ctx.domain.x.contains(x) && ctx.domain.y.contains(y);
        let previous = self.state.cursor_value;
        let cursor_value = in_bounds.then(|| CursorValue::new(x, y));
        self.state.cursor_value = cursor_value;

        if in_bounds {
            if let Some(callback) = self.on_cursor_change.as_mut() {
                callback(cursor_value);
            }
        } else if previous.is_some() {
            let default = self
                .props
                .default_cursor_value
                .map(|default| resolve_default(default, &ctx.domain, self.props.cursor_dimension));
            if let Some(callback) = self.on_cursor_change.as_mut() {
                callback(default);
            }
        }
        vec![Mutation::parent(StateChange::Cursor(self.state))]
    }
}

impl ContainerBehavior for CursorContainer {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn gestures(&self) -> &'static [Gesture] {
        &[Gesture::PointerMove]
    }

    fn handle(&mut self, event: &ContainerEvent, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        match event {
            ContainerEvent::PointerMove(pointer) => self.pointer_move(ctx, pointer),
            _ => Vec::new(),
        }
    }
}
