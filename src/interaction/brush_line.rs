//! One-dimensional brush drawn along an axis line.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::plot::PlotContext;
use crate::core::scale::Scale;
use crate::core::types::{Axis, Domain, Point, SMALL_NUMBER};
use crate::interaction::container::ContainerBehavior;
use crate::interaction::mutation::{Mutation, StateChange};
use crate::interaction::rate_limiter::RateLimiter;
use crate::interaction::{ContainerEvent, Gesture};

pub const BRUSH_THROTTLE_MS: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushHandle {
    Min,
    Max,
    /// The handle zones overlap; the drag direction decides.
    Both,
}

/// Zones highlighted while hovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActiveBrushes {
    pub brush_area: bool,
    pub brush: bool,
    pub min_handle: bool,
    pub max_handle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushLineProps {
    #[serde(default = "default_dimension")]
    pub dimension: Axis,
    #[serde(default = "default_handle_width")]
    pub handle_width: f64,
    #[serde(default = "default_true")]
    pub allow_drag: bool,
    #[serde(default = "default_true")]
    pub allow_resize: bool,
    #[serde(default)]
    pub brush_domain: Option<Domain>,
}

fn default_dimension() -> Axis {
    Axis::X
}

fn default_handle_width() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

impl Default for BrushLineProps {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            handle_width: default_handle_width(),
            allow_drag: true,
            allow_resize: true,
            brush_domain: None,
        }
    }
}

impl BrushLineProps {
    #[must_use]
    pub fn with_dimension(mut self, dimension: Axis) -> Self {
        self.dimension = dimension;
        self
    }

    #[must_use]
    pub fn with_handle_width(mut self, width: f64) -> Self {
        self.handle_width = width.max(0.0);
        self
    }

    #[must_use]
    pub fn with_allow_drag(mut self, allow: bool) -> Self {
        self.allow_drag = allow;
        self
    }

    #[must_use]
    pub fn with_allow_resize(mut self, allow: bool) -> Self {
        self.allow_resize = allow;
        self
    }

    #[must_use]
    pub fn with_brush_domain(mut self, domain: Domain) -> Self {
        self.brush_domain = Some(domain);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BrushLineState {
    pub brush_domain: Option<Domain>,
    pub active_handle: Option<BrushHandle>,
    pub is_panning: bool,
    pub is_selecting: bool,
    /// Pixel position the current gesture is anchored at.
    pub start_position: Option<f64>,
    pub active_brushes: ActiveBrushes,
}

impl BrushLineState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.is_panning && !self.is_selecting
    }
}

/// Handle under `position`, given the brush's sorted pixel range.
#[must_use]
pub fn active_handle(position: f64, range: (f64, f64), handle_width: f64) -> Option<BrushHandle> {
    let half = handle_width / 2.0;
    let on_min = (position - range.0).abs() <= half;
    let on_max = (position - range.1).abs() <= half;
    match (on_min, on_max) {
        (true, true) => Some(BrushHandle::Both),
        (true, false) => Some(BrushHandle::Min),
        (false, true) => Some(BrushHandle::Max),
        (false, false) => None,
    }
}

/// Shifts `range` by `delta` pixels without leaving `full`.
///
/// Returns the shifted range and whether it ended up touching an edge.
#[must_use]
pub fn pan_range(range: (f64, f64), full: (f64, f64), delta: f64) -> ((f64, f64), bool) {
    let width = range.1 - range.0;
    let mut low = range.0 + delta;
    let mut high = range.1 + delta;
    if low <= full.0 {
        low = full.0;
        high = (full.0 + width).min(full.1);
        return ((low, high), true);
    }
    if high >= full.1 {
        high = full.1;
        low = (full.1 - width).max(full.0);
        return ((low, high), true);
    }
    ((low, high), false)
}

fn sorted_pixels(scale: &dyn Scale, domain: Domain) -> (f64, f64) {
    let a = scale.apply(domain.start);
    let b = scale.apply(domain.end);
    (a.min(b), a.max(b))
}

fn domain_from_pixels(scale: &dyn Scale, a: f64, b: f64, full: Domain) -> Domain {
    let start = scale.invert(a);
    let end = scale.invert(b);
    Domain::new(
        start.min(end).max(full.min()),
        start.max(end).min(full.max()),
    )
    .with_temporal(full.temporal)
}

type DomainCallback = Box<dyn FnMut(Domain)>;

pub struct BrushLine {
    props: BrushLineProps,
    state: BrushLineState,
    limiter: RateLimiter,
    /// Set while a fresh selection has not been dragged yet.
    placeholder: bool,
    on_brush_domain_change: Option<DomainCallback>,
}

impl fmt::Debug for BrushLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrushLine")
            .field("props", &self.props)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl BrushLine {
    #[must_use]
    pub fn new(props: BrushLineProps) -> Self {
        Self {
            state: BrushLineState {
                brush_domain: props.brush_domain,
                ..BrushLineState::default()
            },
            props,
            limiter: RateLimiter::new(BRUSH_THROTTLE_MS),
            placeholder: false,
            on_brush_domain_change: None,
        }
    }

    #[must_use]
    pub fn on_brush_domain_change(mut self, callback: impl FnMut(Domain) + 'static) -> Self {
        self.on_brush_domain_change = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn props(&self) -> &BrushLineProps {
        &self.props
    }

    #[must_use]
    pub fn state(&self) -> &BrushLineState {
        &self.state
    }

    /// Selected interval, or the full domain when nothing is brushed.
    #[must_use]
    pub fn current_domain(&self, ctx: &PlotContext<'_>) -> Domain {
        self.state
            .brush_domain
            .unwrap_or_else(|| ctx.domain.get(self.props.dimension))
            .sorted()
    }

    fn scale<'c>(&self, ctx: &'c PlotContext<'_>) -> &'c dyn Scale {
        ctx.scales.get(self.props.dimension).as_ref()
    }

    fn hover(&self, ctx: &PlotContext<'_>, position: f64) -> ActiveBrushes {
        let scale = self.scale(ctx);
        let range = sorted_pixels(scale, self.current_domain(ctx));
        let handle = active_handle(position, range, self.props.handle_width);
        let inside = position >= range.0 && position <= range.1;
        ActiveBrushes {
            brush_area: !inside,
            brush: inside,
            min_handle: matches!(handle, Some(BrushHandle::Min | BrushHandle::Both)),
            max_handle: matches!(handle, Some(BrushHandle::Max | BrushHandle::Both)),
        }
    }

    fn state_mutation(&self) -> Vec<Mutation> {
        vec![Mutation::parent(StateChange::BrushLine(self.state))]
    }

    fn notify(&mut self, domain: Domain) {
        if let Some(callback) = self.on_brush_domain_change.as_mut() {
            callback(domain);
        }
    }

    pub fn pointer_enter(&mut self, ctx: &PlotContext<'_>, point: Point) -> Vec<Mutation> {
        let position = ctx.pixel_on_axis(self.props.dimension, point);
        self.state.active_brushes = self.hover(ctx, position);
        self.state_mutation()
    }

    pub fn pointer_down(&mut self, ctx: &PlotContext<'_>, point: Point) -> Vec<Mutation> {
        let dimension = self.props.dimension;
        let position = ctx.pixel_on_axis(dimension, point);
        let full = ctx.domain.get(dimension).sorted();
        let current = self.current_domain(ctx);
        let scale = self.scale(ctx);
        let range = sorted_pixels(scale, current);
        let handle = active_handle(position, range, self.props.handle_width);
        let inside = position >= range.0 && position <= range.1;
        self.placeholder = false;

        if let Some(handle) = handle.filter(|_| self.props.allow_resize) {
            self.state.is_selecting = true;
            self.state.active_handle = Some(handle);
        } else if inside && !current.approx_eq(full) && self.props.allow_drag {
            self.state.is_panning = true;
            self.state.active_handle = None;
        } else if self.props.allow_resize {
            self.state.brush_domain =
                Some(Domain::new(0.0, SMALL_NUMBER).with_temporal(full.temporal));
            self.placeholder = true;
            self.state.is_selecting = true;
            self.state.active_handle = None;
        } else {
            return Vec::new();
        }
        self.state.start_position = Some(position);
        debug!(
            ?handle,
            panning = self.state.is_panning,
            selecting = self.state.is_selecting,
            "brush line gesture started"
        );
        self.state_mutation()
    }

    pub fn pointer_move(&mut self, ctx: &PlotContext<'_>, point: Point, timestamp_ms: f64) -> Vec<Mutation> {
        let dimension = self.props.dimension;
        let position = ctx.pixel_on_axis(dimension, point);
        if self.state.is_idle() {
            let hover = self.hover(ctx, position);
            if hover == self.state.active_brushes {
                return Vec::new();
            }
            self.state.active_brushes = hover;
            return self.state_mutation();
        }
        if !self.limiter.try_acquire(timestamp_ms) {
            trace!(timestamp_ms, "throttled brush line move");
            return Vec::new();
        }

        let Some(start) = self.state.start_position else {
            return Vec::new();
        };
        let full = ctx.domain.get(dimension).sorted();
        let scale = self.scale(ctx);
        let full_range = sorted_pixels(scale, full);
        let clamped = position.clamp(full_range.0, full_range.1);

        let domain = if self.state.is_panning {
            let range = sorted_pixels(scale, self.current_domain(ctx));
            let (panned, at_edge) = pan_range(range, full_range, position - start);
            if !at_edge {
                self.state.start_position = Some(position);
            }
            domain_from_pixels(scale, panned.0, panned.1, full)
        } else {
            let range = sorted_pixels(scale, self.current_domain(ctx));
            let (fixed, handle) = match self.state.active_handle {
                None => (start.clamp(full_range.0, full_range.1), None),
                Some(BrushHandle::Min) => (range.1, Some(BrushHandle::Min)),
                Some(BrushHandle::Max) => (range.0, Some(BrushHandle::Max)),
                Some(BrushHandle::Both) => {
                    if clamped < start {
                        (range.1, Some(BrushHandle::Min))
                    } else {
                        (range.0, Some(BrushHandle::Max))
                    }
                }
            };
            self.state.active_handle = match handle {
                Some(BrushHandle::Min) if clamped > fixed => Some(BrushHandle::Max),
                Some(BrushHandle::Max) if clamped < fixed => Some(BrushHandle::Min),
                other => other,
            };
            domain_from_pixels(scale, fixed, clamped, full)
        };

        self.placeholder = false;
        self.state.brush_domain = Some(domain);
        self.notify(domain);
        self.state_mutation()
    }

    pub fn pointer_up(&mut self, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        let finished_resize = self.state.is_selecting;
        self.state.is_panning = false;
        self.state.is_selecting = false;
        self.state.active_handle = None;
        self.state.start_position = None;
        self.limiter.reset();
        if std::mem::take(&mut self.placeholder) {
            // Released without dragging: the brush covers everything again.
            self.state.brush_domain = None;
            let full = self.current_domain(ctx);
            debug!(start = full.start, end = full.end, "brush line cleared by click");
            self.notify(full);
        } else if finished_resize && self.props.allow_resize {
            let domain = self.current_domain(ctx);
            debug!(start = domain.start, end = domain.end, "brush line resize finished");
            self.notify(domain);
        }
        self.state_mutation()
    }

    pub fn pointer_leave(&mut self) -> Vec<Mutation> {
        self.state.active_brushes = ActiveBrushes::default();
        self.state_mutation()
    }
}

impl ContainerBehavior for BrushLine {
    fn name(&self) -> &'static str {
        "brush-line"
    }

    fn gestures(&self) -> &'static [Gesture] {
        &[
            Gesture::PointerEnter,
            Gesture::PointerDown,
            Gesture::PointerMove,
            Gesture::PointerUp,
            Gesture::PointerLeave,
        ]
    }

    fn handle(&mut self, event: &ContainerEvent, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        match event {
            ContainerEvent::PointerEnter(pointer) => self.pointer_enter(ctx, pointer.position),
            ContainerEvent::PointerDown(pointer) => self.pointer_down(ctx, pointer.position),
            ContainerEvent::PointerMove(pointer) => {
                self.pointer_move(ctx, pointer.position, pointer.timestamp_ms)
            }
            ContainerEvent::PointerUp(_) => self.pointer_up(ctx),
            ContainerEvent::PointerLeave(_) => self.pointer_leave(),
            ContainerEvent::Wheel(_) => Vec::new(),
        }
    }
}
