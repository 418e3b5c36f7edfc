//! Rectangular brush over the plot area.
//!
//! The brushed region lives in pixel space while a gesture is in progress
//! and is converted back to a [`DomainBox`] for every notification. Only the
//! brushed dimensions move; the other dimension always spans the full domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::plot::PlotContext;
use crate::core::props::PixelBox;
use crate::core::types::{Axis, Domain, DomainBox, Point, SMALL_NUMBER};
use crate::interaction::container::ContainerBehavior;
use crate::interaction::mutation::{Mutation, StateChange};
use crate::interaction::rate_limiter::RateLimiter;
use crate::interaction::{ContainerEvent, Gesture};

pub const BRUSH_CONTAINER_THROTTLE_MS: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushEdge {
    Top,
    Bottom,
    Left,
    Right,
}

/// What a click without a drag selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultBrushArea {
    /// The full domain.
    #[default]
    All,
    /// A degenerate, effectively empty selection.
    None,
    /// Keep the selection that existed before the click.
    Disable,
    /// Re-center the previous selection on the click.
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushProps {
    /// `None` brushes both dimensions.
    #[serde(default)]
    pub brush_dimension: Option<Axis>,
    #[serde(default = "default_handle_width")]
    pub handle_width: f64,
    #[serde(default = "default_true")]
    pub allow_drag: bool,
    #[serde(default = "default_true")]
    pub allow_resize: bool,
    #[serde(default = "default_true")]
    pub allow_draw: bool,
    #[serde(default)]
    pub default_brush_area: DefaultBrushArea,
    #[serde(default)]
    pub brush_domain: Option<DomainBox>,
}

fn default_handle_width() -> f64 {
    8.0
}

fn default_true() -> bool {
    true
}

impl Default for BrushProps {
    fn default() -> Self {
        Self {
            brush_dimension: None,
            handle_width: default_handle_width(),
            allow_drag: true,
            allow_resize: true,
            allow_draw: true,
            default_brush_area: DefaultBrushArea::All,
            brush_domain: None,
        }
    }
}

impl BrushProps {
    #[must_use]
    pub fn with_dimension(mut self, dimension: Axis) -> Self {
        self.brush_dimension = Some(dimension);
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
    pub fn with_allow_draw(mut self, allow: bool) -> Self {
        self.allow_draw = allow;
        self
    }

    #[must_use]
    pub fn with_default_brush_area(mut self, area: DefaultBrushArea) -> Self {
        self.default_brush_area = area;
        self
    }

    #[must_use]
    pub fn with_brush_domain(mut self, domain: DomainBox) -> Self {
        self.brush_domain = Some(domain);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BrushState {
    pub current_domain: Option<DomainBox>,
    /// Selection at the start of the current gesture.
    pub cached_brush_domain: Option<DomainBox>,
    pub is_panning: bool,
    pub is_selecting: bool,
    pub active_handles: SmallVec<[BrushEdge; 2]>,
    pub start_x: Option<f64>,
    pub start_y: Option<f64>,
    /// Selection in pixels; `x2`/`y2` follow the pointer while selecting.
    pub selection: PixelBox,
    pub full_domain_box: PixelBox,
}

/// Screen axes (x, y) the brush may move along.
fn brushed_screen_axes(dimension: Option<Axis>, horizontal: bool) -> (bool, bool) {
    match dimension.map(|axis| axis.current(horizontal)) {
        None => (true, true),
        Some(Axis::X) => (true, false),
        Some(Axis::Y) => (false, true),
    }
}

/// Pixel box of `selected`, using the full domain on dimensions that are
/// not brushed.
#[must_use]
pub fn domain_box(
    ctx: &PlotContext<'_>,
    dimension: Option<Axis>,
    selected: Option<&DomainBox>,
) -> PixelBox {
    let full = ctx.domain;
    let pick = |axis: Axis| match selected {
        Some(selected) if dimension.is_none_or(|d| d == axis) => selected.get(axis),
        _ => full.get(axis),
    };
    let x = pick(Axis::X);
    let y = pick(Axis::Y);
    let low = ctx.scale_point(x.start, y.start);
    let high = ctx.scale_point(x.end, y.end);
    PixelBox::new(
        low.x.min(high.x),
        low.y.min(high.y),
        low.x.max(high.x),
        low.y.max(high.y),
    )
}

/// Hit zone of each edge, `handle_width` wide and centered on the edge.
#[must_use]
pub fn handles(bounds: PixelBox, handle_width: f64) -> [(BrushEdge, PixelBox); 4] {
    let half = handle_width / 2.0;
    let (x1, x2, y1, y2) = (bounds.min_x(), bounds.max_x(), bounds.min_y(), bounds.max_y());
    [
        (BrushEdge::Top, PixelBox::new(x1, y1 - half, x2, y1 + half)),
        (BrushEdge::Bottom, PixelBox::new(x1, y2 - half, x2, y2 + half)),
        (BrushEdge::Left, PixelBox::new(x1 - half, y1, x1 + half, y2)),
        (BrushEdge::Right, PixelBox::new(x2 - half, y1, x2 + half, y2)),
    ]
}

/// Edges under `point` that the brush dimension allows to move.
#[must_use]
pub fn active_handles(
    point: Point,
    bounds: PixelBox,
    handle_width: f64,
    (brush_x, brush_y): (bool, bool),
) -> SmallVec<[BrushEdge; 2]> {
    handles(bounds, handle_width)
        .into_iter()
        .filter(|(edge, zone)| {
            let allowed = match edge {
                BrushEdge::Top | BrushEdge::Bottom => brush_y,
                BrushEdge::Left | BrushEdge::Right => brush_x,
            };
            allowed && zone.contains(point, 0.0)
        })
        .map(|(edge, _)| edge)
        .collect()
}

/// Orients `bounds` so that `x2`/`y2` sit on the edges being dragged.
#[must_use]
pub fn resize_box(bounds: PixelBox, edges: &[BrushEdge]) -> PixelBox {
    let (x_min, x_max) = (bounds.min_x(), bounds.max_x());
    let (y_min, y_max) = (bounds.min_y(), bounds.max_y());
    edges.iter().fold(
        PixelBox::new(x_min, y_min, x_max, y_max),
        |mut resized, edge| {
            match edge {
                BrushEdge::Left => (resized.x1, resized.x2) = (x_max, x_min),
                BrushEdge::Right => (resized.x1, resized.x2) = (x_min, x_max),
                BrushEdge::Top => (resized.y1, resized.y2) = (y_max, y_min),
                BrushEdge::Bottom => (resized.y1, resized.y2) = (y_min, y_max),
            }
            resized
        },
    )
}

/// Keeps `candidate` inside `full`, preserving its size where it overflows.
#[must_use]
pub fn constrain_box(candidate: PixelBox, full: PixelBox) -> PixelBox {
    let width = (candidate.x2 - candidate.x1).abs();
    let height = (candidate.y2 - candidate.y1).abs();
    let (fx1, fx2, fy1, fy2) = (full.min_x(), full.max_x(), full.min_y(), full.max_y());
    PixelBox {
        x1: if candidate.x2 > fx2 {
            fx2 - width
        } else {
            candidate.x1.max(fx1)
        },
        y1: if candidate.y2 > fy2 {
            fy2 - height
        } else {
            candidate.y1.max(fy1)
        },
        x2: if candidate.x1 < fx1 {
            fx1 + width
        } else {
            candidate.x2.min(fx2)
        },
        y2: if candidate.y1 < fy1 {
            fy1 + height
        } else {
            candidate.y2.min(fy2)
        },
    }
}

/// Data domain under a pixel box; unbrushed dimensions keep the full domain.
#[must_use]
pub fn domain_from_box(ctx: &PlotContext<'_>, dimension: Option<Axis>, bounds: PixelBox) -> DomainBox {
    let full = ctx.domain;
    let (ax, ay) = ctx.data_coordinates(Point::new(bounds.min_x(), bounds.min_y()));
    let (bx, by) = ctx.data_coordinates(Point::new(bounds.max_x(), bounds.max_y()));
    let span = |a: f64, b: f64, full: Domain| {
        Domain::new(a.min(b), a.max(b)).with_temporal(full.temporal)
    };
    let brushed = |axis: Axis| dimension.is_none_or(|d| d == axis);
    DomainBox::new(
        if brushed(Axis::X) { span(ax, bx, full.x) } else { full.x },
        if brushed(Axis::Y) { span(ay, by, full.y) } else { full.y },
    )
}

/// Selection used for "nothing selected yet".
#[must_use]
pub fn minimum_domain() -> DomainBox {
    DomainBox::new(Domain::new(0.0, SMALL_NUMBER), Domain::new(0.0, SMALL_NUMBER))
}

type DomainBoxCallback = Box<dyn FnMut(DomainBox)>;

pub struct BrushContainer {
    props: BrushProps,
    state: BrushState,
    limiter: RateLimiter,
    on_brush_domain_change: Option<DomainBoxCallback>,
    on_brush_domain_change_end: Option<DomainBoxCallback>,
    on_brush_cleared: Option<DomainBoxCallback>,
}

impl fmt::Debug for BrushContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrushContainer")
            .field("props", &self.props)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl BrushContainer {
    #[must_use]
    pub fn new(props: BrushProps) -> Self {
        Self {
            state: BrushState {
                current_domain: props.brush_domain,
                ..BrushState::default()
            },
            props,
            limiter: RateLimiter::new(BRUSH_CONTAINER_THROTTLE_MS),
            on_brush_domain_change: None,
            on_brush_domain_change_end: None,
            on_brush_cleared: None,
        }
    }

    #[must_use]
    pub fn on_brush_domain_change(mut self, callback: impl FnMut(DomainBox) + 'static) -> Self {
        self.on_brush_domain_change = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_brush_domain_change_end(mut self, callback: impl FnMut(DomainBox) + 'static) -> Self {
        self.on_brush_domain_change_end = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_brush_cleared(mut self, callback: impl FnMut(DomainBox) + 'static) -> Self {
        self.on_brush_cleared = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn props(&self) -> &BrushProps {
        &self.props
    }

    #[must_use]
    pub fn state(&self) -> &BrushState {
        &self.state
    }

    /// Selected domain, or the full domain when nothing is brushed.
    #[must_use]
    pub fn current_domain(&self, ctx: &PlotContext<'_>) -> DomainBox {
        self.state.current_domain.unwrap_or(ctx.domain)
    }

    fn brushed_axes(&self, ctx: &PlotContext<'_>) -> (bool, bool) {
        brushed_screen_axes(self.props.brush_dimension, ctx.layout.horizontal)
    }

    fn state_mutation(&self) -> Vec<Mutation> {
        vec![Mutation::parent(StateChange::Brush(self.state.clone()))]
    }

    pub fn pointer_down(&mut self, ctx: &PlotContext<'_>, point: Point) -> Vec<Mutation> {
        let BrushProps {
            brush_dimension,
            handle_width,
            allow_drag,
            allow_resize,
            allow_draw,
            default_brush_area,
            ..
        } = self.props;
        if !allow_resize && !allow_drag {
            return Vec::new();
        }
        let full_box = domain_box(ctx, brush_dimension, None);
        if !full_box.contains(point, handle_width) {
            trace!(x = point.x, y = point.y, "brush pointer down outside plot");
            return Vec::new();
        }

        let current = self.current_domain(ctx);
        let selected_box = domain_box(ctx, brush_dimension, Some(&current));
        let axes = self.brushed_axes(ctx);
        let edges = if allow_resize {
            active_handles(point, selected_box, handle_width, axes)
        } else {
            SmallVec::new()
        };

        self.state.full_domain_box = full_box;
        self.state.cached_brush_domain = Some(current);
        if !edges.is_empty() {
            self.state.selection = resize_box(selected_box, &edges);
            self.state.is_selecting = true;
            self.state.active_handles = edges;
            self.state.current_domain = Some(current);
        } else if selected_box.contains(point, 0.0) && !current.approx_eq(&ctx.domain) {
            self.state.is_panning = allow_drag;
            self.state.start_x = Some(point.x);
            self.state.start_y = Some(point.y);
            self.state.selection = selected_box;
            self.state.current_domain = Some(current);
        } else if allow_draw {
            let (brush_x, brush_y) = axes;
            self.state.is_selecting = allow_resize || default_brush_area == DefaultBrushArea::Move;
            self.state.active_handles = SmallVec::new();
            self.state.current_domain = Some(minimum_domain());
            self.state.selection = PixelBox {
                x1: if brush_x { point.x } else { selected_box.x1 },
                x2: if brush_x { point.x } else { selected_box.x2 },
                y1: if brush_y { point.y } else { selected_box.y1 },
                y2: if brush_y { point.y } else { selected_box.y2 },
            };
        } else {
            return Vec::new();
        }
        debug!(
            panning = self.state.is_panning,
            selecting = self.state.is_selecting,
            handles = ?self.state.active_handles,
            "brush gesture started"
        );
        self.state_mutation()
    }

    pub fn pointer_move(&mut self, ctx: &PlotContext<'_>, point: Point, timestamp_ms: f64) -> Vec<Mutation> {
        if !self.state.is_panning && !self.state.is_selecting {
            return Vec::new();
        }
        if !self.limiter.try_acquire(timestamp_ms) {
            trace!(timestamp_ms, "throttled brush move");
            return Vec::new();
        }
        let dimension = self.props.brush_dimension;
        let (brush_x, brush_y) = self.brushed_axes(ctx);
        let full_box = self.state.full_domain_box;

        let domain = if self.state.is_panning {
            let selection = self.state.selection;
            let dx = self.state.start_x.map_or(0.0, |start| start - point.x);
            let dy = self.state.start_y.map_or(0.0, |start| start - point.y);
            let panned = PixelBox {
                x1: if brush_x { selection.min_x() - dx } else { selection.min_x() },
                x2: if brush_x { selection.max_x() - dx } else { selection.max_x() },
                y1: if brush_y { selection.min_y() - dy } else { selection.min_y() },
                y2: if brush_y { selection.max_y() - dy } else { selection.max_y() },
            };
            let constrained = constrain_box(panned, full_box);
            if !(panned.x2 >= full_box.max_x() || panned.x1 <= full_box.min_x()) {
                self.state.start_x = Some(point.x);
            }
            if !(panned.y2 >= full_box.max_y() || panned.y1 <= full_box.min_y()) {
                self.state.start_y = Some(point.y);
            }
            self.state.selection = constrained;
            domain_from_box(ctx, dimension, constrained)
        } else {
            let handles = &self.state.active_handles;
            let moves_x = if handles.is_empty() {
                brush_x
            } else {
                handles.iter().any(|edge| matches!(edge, BrushEdge::Left | BrushEdge::Right))
            };
            let moves_y = if handles.is_empty() {
                brush_y
            } else {
                handles.iter().any(|edge| matches!(edge, BrushEdge::Top | BrushEdge::Bottom))
            };
            if moves_x {
                self.state.selection.x2 = point.x.clamp(full_box.min_x(), full_box.max_x());
            }
            if moves_y {
                self.state.selection.y2 = point.y.clamp(full_box.min_y(), full_box.max_y());
            }
            domain_from_box(ctx, dimension, self.state.selection)
        };

        self.state.current_domain = Some(domain);
        if let Some(callback) = self.on_brush_domain_change.as_mut() {
            callback(domain);
        }
        self.state_mutation()
    }

    pub fn pointer_up(&mut self, ctx: &PlotContext<'_>, point: Point) -> Vec<Mutation> {
        let BrushProps {
            brush_dimension,
            allow_drag,
            allow_resize,
            default_brush_area,
            ..
        } = self.props;
        let was_panning = self.state.is_panning;
        let was_selecting = self.state.is_selecting;
        if !was_panning && !was_selecting {
            return Vec::new();
        }
        self.state.is_panning = false;
        self.state.is_selecting = false;
        self.state.active_handles.clear();
        self.limiter.reset();

        let selection = self.state.selection;
        let has_area = default_brush_area != DefaultBrushArea::None;
        let collapsed = selection.x1 == selection.x2 || selection.y1 == selection.y2;
        if (allow_resize || has_area) && collapsed {
            let cached = self.state.cached_brush_domain.unwrap_or(ctx.domain);
            let area = default_brush_area;
            let domain = match area {
                DefaultBrushArea::All => ctx.domain,
                DefaultBrushArea::None => minimum_domain(),
                DefaultBrushArea::Disable => cached,
                DefaultBrushArea::Move => {
                    let cached_box = domain_box(ctx, brush_dimension, Some(&cached));
                    let (brush_x, brush_y) = self.brushed_axes(ctx);
                    let half_w = cached_box.width() / 2.0;
                    let half_h = cached_box.height() / 2.0;
                    let moved = PixelBox {
                        x1: if brush_x { point.x - half_w } else { cached_box.x1 },
                        x2: if brush_x { point.x + half_w } else { cached_box.x2 },
                        y1: if brush_y { point.y - half_h } else { cached_box.y1 },
                        y2: if brush_y { point.y + half_h } else { cached_box.y2 },
                    };
                    let constrained = constrain_box(moved, self.state.full_domain_box);
                    self.state.selection = constrained;
                    domain_from_box(ctx, brush_dimension, constrained)
                }
            };
            debug!(?area, "brush cleared to default area");
            self.state.current_domain = Some(domain);
            for callback in [
                self.on_brush_domain_change.as_mut(),
                self.on_brush_cleared.as_mut(),
                self.on_brush_domain_change_end.as_mut(),
            ]
            .into_iter()
            .flatten()
            {
                callback(domain);
            }
        } else if (allow_drag && was_panning) || (allow_resize && was_selecting) {
            let domain = self.current_domain(ctx);
            if let Some(callback) = self.on_brush_domain_change_end.as_mut() {
                callback(domain);
            }
        }
        self.state_mutation()
    }

    pub fn pointer_leave(&mut self) -> Vec<Mutation> {
        if !self.state.is_panning && !self.state.is_selecting {
            return Vec::new();
        }
        self.state.is_panning = false;
        self.state.is_selecting = false;
        self.state.active_handles.clear();
        self.state_mutation()
    }
}

impl ContainerBehavior for BrushContainer {
    fn name(&self) -> &'static str {
        "brush"
    }

    fn gestures(&self) -> &'static [Gesture] {
        &[
            Gesture::PointerDown,
            Gesture::PointerMove,
            Gesture::PointerUp,
            Gesture::PointerLeave,
        ]
    }

    fn handle(&mut self, event: &ContainerEvent, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        match event {
            ContainerEvent::PointerDown(pointer) => self.pointer_down(ctx, pointer.position),
            ContainerEvent::PointerMove(pointer) => {
                self.pointer_move(ctx, pointer.position, pointer.timestamp_ms)
            }
            ContainerEvent::PointerUp(pointer) => self.pointer_up(ctx, pointer.position),
            ContainerEvent::PointerLeave(_) => self.pointer_leave(),
            _ => Vec::new(),
        }
    }
}
