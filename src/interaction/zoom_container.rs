//! Wheel zoom and drag pan over the chart domain.
//!
//! The container never leaves the original (unzoomed) domain: panning clamps
//! against it and zooming out stops at it. Polar charts only zoom radially.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::plot::PlotContext;
use crate::core::props::{DomainProps, PerAxis, PixelBox};
use crate::core::tree::{NodeId, NodeRole, get_domain_from_children};
use crate::core::types::{Axis, Datum, Domain, DomainBox, Point};
use crate::interaction::container::{ChildRender, ContainerBehavior};
use crate::interaction::mutation::{Mutation, StateChange};
use crate::interaction::rate_limiter::RateLimiter;
use crate::interaction::{ContainerEvent, Gesture};

pub const ZOOM_THROTTLE_MS: f64 = 16.0;
/// Point budget used when downsampling is enabled without an explicit one.
pub const DEFAULT_DOWNSAMPLE_POINTS: usize = 150;
/// Wheel delta that maps to the maximum per-event zoom step.
const WHEEL_DELTA_DIVISOR: f64 = 300.0;
const MAX_WHEEL_STEP: f64 = 0.5;
/// Default minimum zoom extent as a fraction of the original span.
const DEFAULT_MINIMUM_ZOOM_FRACTION: f64 = 1.0 / 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomProps {
    /// `None` zooms both dimensions.
    #[serde(default)]
    pub zoom_dimension: Option<Axis>,
    /// Smallest domain extent reachable by zooming in.
    #[serde(default)]
    pub minimum_zoom: Option<PerAxis<f64>>,
    #[serde(default = "default_true")]
    pub allow_pan: bool,
    #[serde(default = "default_true")]
    pub allow_zoom: bool,
    /// Maximum points rendered per series; `None` disables downsampling.
    #[serde(default)]
    pub downsample: Option<usize>,
    /// Host-controlled domain; takes over whenever it changes.
    #[serde(default)]
    pub zoom_domain: Option<DomainBox>,
}

fn default_true() -> bool {
    true
}

impl Default for ZoomProps {
    fn default() -> Self {
        Self {
            zoom_dimension: None,
            minimum_zoom: None,
            allow_pan: true,
            allow_zoom: true,
            downsample: None,
            zoom_domain: None,
        }
    }
}

impl ZoomProps {
    #[must_use]
    pub fn with_dimension(mut self, dimension: Axis) -> Self {
        self.zoom_dimension = Some(dimension);
        self
    }

    #[must_use]
    pub fn with_minimum_zoom(mut self, minimum: PerAxis<f64>) -> Self {
        self.minimum_zoom = Some(minimum);
        self
    }

    #[must_use]
    pub fn with_allow_pan(mut self, allow: bool) -> Self {
        self.allow_pan = allow;
        self
    }

    #[must_use]
    pub fn with_allow_zoom(mut self, allow: bool) -> Self {
        self.allow_zoom = allow;
        self
    }

    #[must_use]
    pub fn with_downsample(mut self, max_points: usize) -> Self {
        self.downsample = Some(max_points.max(1));
        self
    }

    #[must_use]
    pub fn with_default_downsample(self) -> Self {
        self.with_downsample(DEFAULT_DOWNSAMPLE_POINTS)
    }

    #[must_use]
    pub fn with_zoom_domain(mut self, domain: DomainBox) -> Self {
        self.zoom_domain = Some(domain);
        self
    }

    fn zooms(&self, axis: Axis) -> bool {
        self.zoom_dimension.is_none_or(|dimension| dimension == axis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoomState {
    pub current_domain: Option<DomainBox>,
    /// `zoom_domain` as of the last interaction; a difference means the host
    /// changed it since.
    pub cached_zoom_domain: Option<DomainBox>,
    pub original_domain: Option<DomainBox>,
    pub start_x: Option<f64>,
    pub start_y: Option<f64>,
    pub panning: bool,
    pub zoom_active: bool,
}

/// Per-event wheel zoom factor; above 1 zooms out.
#[must_use]
pub fn scale_factor(delta_y: f64) -> f64 {
    let sign = if delta_y > 0.0 { 1.0 } else { -1.0 };
    let step = (delta_y / WHEEL_DELTA_DIVISOR).abs().min(MAX_WHEEL_STEP);
    (1.0 + sign * step).abs()
}

/// `domain` scaled by `factor` around the fraction `percent` of its span.
#[must_use]
pub fn scaled_domain(domain: Domain, factor: f64, percent: f64) -> Domain {
    let span = (domain.end - domain.start).abs();
    let diff = span - span * factor;
    let low = domain.start + diff * percent;
    let high = domain.end - diff * (1.0 - percent);
    Domain::new(low.min(high), low.max(high)).with_temporal(domain.temporal)
}

/// Smallest allowed domain centered on `point`, kept inside `original`.
#[must_use]
pub fn minimum_domain(point: f64, original: Domain, minimum_zoom: Option<f64>) -> Domain {
    let (from, to) = (original.start, original.end);
    let extent = minimum_zoom
        .filter(|extent| *extent > 0.0)
        .unwrap_or_else(|| (from - to).abs() * DEFAULT_MINIMUM_ZOOM_FRACTION);
    let low = point - extent / 2.0;
    let high = point + extent / 2.0;
    Domain::new(
        if low > from && low < to { low } else { from },
        if high < to && high > from {
            high
        } else {
            from + extent / 2.0
        },
    )
    .with_temporal(original.temporal)
}

/// `current` shifted by `delta`, clamped to `original` with its span kept.
#[must_use]
pub fn pan_domain(current: Domain, original: Domain, delta: f64) -> Domain {
    let low = current.start + delta;
    let high = current.end + delta;
    let span = current.end - current.start;
    let panned = if low > original.start && high < original.end {
        Domain::new(low, high)
    } else if low < original.start {
        Domain::new(original.start, original.start + span)
    } else if high > original.end {
        Domain::new(original.end - span, original.end)
    } else {
        current
    };
    panned.with_temporal(current.temporal || original.temporal)
}

/// Keeps every `k`-th point so at most `max_points` remain.
///
/// `k` is a power of two and the phase is taken from the absolute index
/// (`start + i`), so zooming picks the same points consistently.
#[must_use]
pub fn downsample(data: &[Datum], max_points: usize, start: usize) -> Vec<Datum> {
    let max_points = max_points.max(1);
    if data.len() <= max_points {
        return data.to_vec();
    }
    let ratio = data.len() as f64 / max_points as f64;
    let k = 2_usize.pow(ratio.log2().ceil() as u32);
    data.iter()
        .enumerate()
        .filter(|(index, _)| (index + start) % k == 0)
        .map(|(_, datum)| datum.clone())
        .collect()
}

/// Visible slice of `data` (sorted on `dimension`), widened by one point on
/// each side, then downsampled.
#[must_use]
pub fn downsample_zoom_data(
    data: &[Datum],
    domain: Domain,
    dimension: Axis,
    max_points: usize,
) -> Vec<Datum> {
    let len = data.len();
    let start = data
        .iter()
        .position(|datum| datum.get(dimension) >= domain.min())
        .unwrap_or(len);
    let end = data
        .iter()
        .position(|datum| datum.get(dimension) > domain.max());
    let start = start.saturating_sub(1);
    let end = end.map_or(len, |end| (end + 1).min(len));
    if start >= end {
        return Vec::new();
    }
    downsample(&data[start..end], max_points, start)
}

/// A run of children sharing one clip region, or an unclipped axis.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipGroup {
    Axis(NodeId),
    Clipped {
        bounds: PixelBox,
        /// Polar charts clip to a circle of this radius around the origin.
        radius: Option<f64>,
        children: Vec<NodeId>,
    },
}

/// Splits the direct children into clipped data runs separated by axes.
#[must_use]
pub fn clip_groups(ctx: &PlotContext<'_>) -> Vec<ClipGroup> {
    let is_axis = |id: &NodeId| {
        ctx.tree
            .node(*id)
            .is_some_and(|node| node.role.is_axis())
    };
    let range_x = ctx.layout.range(Axis::X);
    let range_y = ctx.layout.range(Axis::Y);
    let bounds = if ctx.layout.polar {
        ctx.layout.plot_bounds()
    } else {
        PixelBox::new(
            range_x.0.min(range_x.1),
            range_y.0.min(range_y.1),
            range_x.0.max(range_x.1),
            range_y.0.max(range_y.1),
        )
    };
    let radius = ctx.layout.polar.then(|| ctx.layout.radius());

    ctx.children
        .chunk_by(|a, b| is_axis(a) == is_axis(b))
        .flat_map(|run| {
            if run.first().is_some_and(is_axis) {
                run.iter().copied().map(ClipGroup::Axis).collect()
            } else {
                vec![ClipGroup::Clipped {
                    bounds,
                    radius,
                    children: run.to_vec(),
                }]
            }
        })
        .collect()
}

type ZoomCallback = Box<dyn FnMut(DomainBox)>;
type ZoomEndCallback = Box<dyn FnMut()>;

pub struct ZoomContainer {
    props: ZoomProps,
    state: ZoomState,
    move_limiter: RateLimiter,
    wheel_limiter: RateLimiter,
    on_zoom_domain_change: Option<ZoomCallback>,
    on_zoom_domain_change_end: Option<ZoomEndCallback>,
}

impl fmt::Debug for ZoomContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomContainer")
            .field("props", &self.props)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ZoomContainer {
    #[must_use]
    pub fn new(props: ZoomProps) -> Self {
        Self {
            state: ZoomState {
                cached_zoom_domain: props.zoom_domain,
                ..ZoomState::default()
            },
            props,
            move_limiter: RateLimiter::new(ZOOM_THROTTLE_MS),
            wheel_limiter: RateLimiter::new(ZOOM_THROTTLE_MS),
            on_zoom_domain_change: None,
            on_zoom_domain_change_end: None,
        }
    }

    #[must_use]
    pub fn on_zoom_domain_change(mut self, callback: impl FnMut(DomainBox) + 'static) -> Self {
        self.on_zoom_domain_change = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_zoom_domain_change_end(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_zoom_domain_change_end = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn props(&self) -> &ZoomProps {
        &self.props
    }

    #[must_use]
    pub fn state(&self) -> &ZoomState {
        &self.state
    }

    /// Replaces the host-controlled domain.
    pub fn set_zoom_domain(&mut self, domain: Option<DomainBox>) {
        self.props.zoom_domain = domain;
    }

    /// Unzoomed domain: the chart domain, with the zoomed dimension taken
    /// from the children when zooming is restricted to one dimension.
    #[must_use]
    pub fn original_domain(&self, ctx: &PlotContext<'_>) -> DomainBox {
        match self.props.zoom_dimension {
            Some(axis) if !ctx.children.is_empty() => {
                let props = DomainProps::new(*ctx.layout);
                ctx.domain.with(
                    axis,
                    get_domain_from_children(ctx.tree, ctx.children, &props, axis),
                )
            }
            _ => ctx.domain,
        }
    }

    /// Domain the next interaction starts from.
    fn last_domain(&self, original: DomainBox) -> DomainBox {
        if let Some(zoom_domain) = self.props.zoom_domain
            && self.state.cached_zoom_domain != Some(zoom_domain)
        {
            return zoom_domain;
        }
        self.state
            .current_domain
            .or(self.props.zoom_domain)
            .unwrap_or(original)
    }

    fn state_mutation(&self) -> Vec<Mutation> {
        vec![Mutation::parent(StateChange::Zoom(self.state))]
    }

    fn commit(&mut self, domain: DomainBox, original: DomainBox, zoom_active: bool) -> Vec<Mutation> {
        self.state.current_domain = Some(domain);
        self.state.original_domain = Some(original);
        self.state.cached_zoom_domain = self.props.zoom_domain;
        self.state.zoom_active = zoom_active;
        if let Some(callback) = self.on_zoom_domain_change.as_mut() {
            callback(domain);
        }
        self.state_mutation()
    }

    /// Fraction of the original domain under `pixel` on `axis`.
    ///
    /// Signed: a pointer before the domain start yields a negative fraction.
    fn scale_percent(ctx: &PlotContext<'_>, axis: Axis, original: Domain, pixel: f64) -> f64 {
        let scale = ctx.scales.get(axis);
        let value = match scale.with_domain(original) {
            Ok(original_scale) => original_scale.invert(pixel),
            Err(_) => scale.invert(pixel),
        };
        let span = original.end - original.start;
        if span == 0.0 {
            return 0.5;
        }
        (value - original.start) / span
    }

    fn zoom_axis(
        &self,
        ctx: &PlotContext<'_>,
        axis: Axis,
        current: Domain,
        original: Domain,
        factor: f64,
        pointer: Point,
    ) -> Domain {
        let (from, to) = (current.start, current.end);
        let span = (to - from).abs();
        let minimum = self
            .props
            .minimum_zoom
            .as_ref()
            .and_then(|minimum| minimum.get(axis));
        if minimum.is_some_and(|minimum| span <= minimum) && factor < 1.0 {
            return current;
        }
        let (from_bound, to_bound) = (original.start, original.end);
        let percent =
            Self::scale_percent(ctx, axis, original, ctx.pixel_on_axis(axis, pointer));
        let point = factor * from + percent * (factor * span);
        let min_domain = minimum_domain(point, original, minimum);
        let scaled = scaled_domain(current, factor, percent);
        let clamped = Domain::new(
            if scaled.start > from_bound && scaled.start < to_bound {
                scaled.start
            } else {
                from_bound
            },
            if scaled.end < to_bound && scaled.end > from_bound {
                scaled.end
            } else {
                to_bound
            },
        )
        .with_temporal(original.temporal);
        if (min_domain.end - min_domain.start).abs() > (clamped.end - clamped.start).abs() {
            min_domain
        } else {
            clamped
        }
    }

    pub fn wheel(&mut self, ctx: &PlotContext<'_>, pointer: Point, delta_y: f64, timestamp_ms: f64) -> Vec<Mutation> {
        if !self.props.allow_zoom {
            return Vec::new();
        }
        if !self.wheel_limiter.try_acquire(timestamp_ms) {
            trace!(timestamp_ms, "throttled zoom wheel");
            return Vec::new();
        }
        let original = self.original_domain(ctx);
        let last = self.last_domain(original);
        let factor = scale_factor(delta_y);
        let zoom = |axis: Axis| {
            if !self.props.zooms(axis) || (ctx.layout.polar && axis == Axis::X) {
                last.get(axis)
            } else {
                self.zoom_axis(ctx, axis, last.get(axis), original.get(axis), factor, pointer)
            }
        };
        let domain = DomainBox::new(zoom(Axis::X), zoom(Axis::Y));
        let zooming_out = delta_y > 0.0;
        let zoom_active = !zooming_out || !original.approx_eq(&last);
        debug!(factor, zoom_active, "zoom wheel");
        self.commit(domain, original, zoom_active)
    }

    pub fn pointer_down(&mut self, point: Point) -> Vec<Mutation> {
        if !self.props.allow_pan {
            return Vec::new();
        }
        self.state.start_x = Some(point.x);
        self.state.start_y = Some(point.y);
        self.state.panning = true;
        self.state_mutation()
    }

    pub fn pointer_move(&mut self, ctx: &PlotContext<'_>, point: Point, timestamp_ms: f64) -> Vec<Mutation> {
        if !self.state.panning || !self.props.allow_pan {
            return Vec::new();
        }
        if !self.move_limiter.try_acquire(timestamp_ms) {
            trace!(timestamp_ms, "throttled zoom pan");
            return Vec::new();
        }
        let original = self.original_domain(ctx);
        let last = self.last_domain(original);
        let start = Point::new(
            self.state.start_x.unwrap_or(point.x),
            self.state.start_y.unwrap_or(point.y),
        );
        let pan = |axis: Axis| {
            if !self.props.zooms(axis) {
                return original.get(axis);
            }
            if ctx.layout.polar && axis == Axis::X {
                return original.x;
            }
            let current = last.get(axis);
            let (r0, r1) = ctx.scales.get(axis).range();
            let span = current.end - current.start;
            if r1 == r0 || span == 0.0 {
                return current;
            }
            let pixels_per_unit = (r1 - r0) / span;
            let moved = ctx.pixel_on_axis(axis, start) - ctx.pixel_on_axis(axis, point);
            pan_domain(current, original.get(axis), moved / pixels_per_unit)
        };
        let domain = DomainBox::new(pan(Axis::X), pan(Axis::Y));
        self.state.start_x = Some(point.x);
        self.state.start_y = Some(point.y);
        let zoom_active = !original.approx_eq(&last);
        self.commit(domain, original, zoom_active)
    }

    pub fn pointer_up(&mut self) -> Vec<Mutation> {
        if !self.props.allow_pan {
            return Vec::new();
        }
        let was_panning = self.state.panning;
        self.state.panning = false;
        self.move_limiter.reset();
        if was_panning && let Some(callback) = self.on_zoom_domain_change_end.as_mut() {
            callback();
        }
        self.state_mutation()
    }

    /// Domain handed to the children of the current render.
    ///
    /// `None` lets children keep their own domain.
    #[must_use]
    pub fn child_domain(&self, ctx: &PlotContext<'_>) -> Option<DomainBox> {
        let original = self.state.original_domain.unwrap_or(ctx.domain);
        let zoom_domain = self.props.zoom_domain.unwrap_or(ctx.domain);
        let cached = self.state.cached_zoom_domain.unwrap_or(ctx.domain);
        let domain = if zoom_domain != cached {
            zoom_domain
        } else if self.props.allow_zoom && !self.state.zoom_active {
            return None;
        } else {
            self.state.current_domain.unwrap_or(original)
        };
        let domain = if ctx.layout.polar {
            DomainBox::new(original.x, Domain::new(0.0, domain.y.max()))
        } else {
            domain
        };
        Some(match self.props.zoom_dimension {
            Some(axis) => zoom_domain.with(axis, domain.get(axis)),
            None => domain,
        })
    }
}

impl ContainerBehavior for ZoomContainer {
    fn name(&self) -> &'static str {
        "zoom"
    }

    fn gestures(&self) -> &'static [Gesture] {
        &[
            Gesture::PointerDown,
            Gesture::PointerMove,
            Gesture::PointerUp,
            Gesture::PointerLeave,
            Gesture::Wheel,
        ]
    }

    fn handle(&mut self, event: &ContainerEvent, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        match event {
            ContainerEvent::PointerDown(pointer) => self.pointer_down(pointer.position),
            ContainerEvent::PointerMove(pointer) => {
                self.pointer_move(ctx, pointer.position, pointer.timestamp_ms)
            }
            ContainerEvent::PointerUp(_) | ContainerEvent::PointerLeave(_) => self.pointer_up(),
            ContainerEvent::Wheel(wheel) => {
                self.wheel(ctx, wheel.position, wheel.delta_y, wheel.timestamp_ms)
            }
            ContainerEvent::PointerEnter(_) => Vec::new(),
        }
    }

    fn modify_children(&self, ctx: &PlotContext<'_>, children: Vec<ChildRender>) -> Vec<ChildRender> {
        let domain = self.child_domain(ctx);
        let dimension = self.props.zoom_dimension.unwrap_or(Axis::X);
        children
            .into_iter()
            .map(|mut child| {
                child.domain = domain.or(child.domain);
                let Some(node) = ctx.tree.node(child.id) else {
                    return child;
                };
                if let (Some(max_points), Some(domain), NodeRole::Series { .. }) =
                    (self.props.downsample, domain, &node.role)
                {
                    child.data = Some(downsample_zoom_data(
                        child.data.as_deref().unwrap_or(node.data.as_slice()),
                        domain.get(dimension),
                        dimension,
                        max_points,
                    ));
                }
                child
            })
            .collect()
    }
}
