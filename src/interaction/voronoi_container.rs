//! Activates the data nearest to the pointer.

use std::fmt;

use tracing::trace;

use crate::core::plot::PlotContext;
use crate::core::style::evaluate_style;
use crate::core::types::{Datum, Point};
use crate::core::voronoi::{VoronoiPoint, VoronoiProps, find_nearest_site, within_bounds};
use crate::interaction::container::ContainerBehavior;
use crate::interaction::mutation::{EventKey, Mutation, StateChange};
use crate::interaction::rate_limiter::RateLimiter;
use crate::interaction::{ContainerEvent, Gesture};

pub const VORONOI_THROTTLE_MS: f64 = 32.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VoronoiState {
    pub active_points: Vec<VoronoiPoint>,
    pub pointer: Option<Point>,
}

type PointsCallback = Box<dyn FnMut(&[VoronoiPoint])>;

pub struct VoronoiContainer {
    props: VoronoiProps,
    data: Option<Vec<Datum>>,
    state: VoronoiState,
    limiter: RateLimiter,
    on_activated: Option<PointsCallback>,
    on_deactivated: Option<PointsCallback>,
}

impl fmt::Debug for VoronoiContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoronoiContainer")
            .field("props", &self.props)
            .field("state", &self.state)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl VoronoiContainer {
    #[must_use]
    pub fn new(props: VoronoiProps) -> Self {
        Self {
            props,
            data: None,
            state: VoronoiState::default(),
            limiter: RateLimiter::new(VORONOI_THROTTLE_MS),
            on_activated: None,
            on_deactivated: None,
        }
    }

    /// Hit-tests these data instead of the child series.
    #[must_use]
    pub fn with_data(mut self, data: Vec<Datum>) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn on_activated(mut self, callback: impl FnMut(&[VoronoiPoint]) + 'static) -> Self {
        self.on_activated = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_deactivated(mut self, callback: impl FnMut(&[VoronoiPoint]) + 'static) -> Self {
        self.on_deactivated = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn props(&self) -> &VoronoiProps {
        &self.props
    }

    #[must_use]
    pub fn state(&self) -> &VoronoiState {
        &self.state
    }

    pub fn pointer_move(&mut self, ctx: &PlotContext<'_>, position: Point, timestamp_ms: f64) -> Vec<Mutation> {
        if !self.limiter.try_acquire(timestamp_ms) {
            trace!(timestamp_ms, "throttled voronoi pointer move");
            return Vec::new();
        }
        if !within_bounds(ctx, &self.props, position) {
            return self.deactivate_all(Some(position));
        }

        let points: Vec<VoronoiPoint> =
            find_nearest_site(ctx, &self.props, self.data.as_deref(), position)
                .map(|site| site.points.into_vec())
                .unwrap_or_default();
        let previous = std::mem::take(&mut self.state.active_points);
        self.state = VoronoiState {
            active_points: points.clone(),
            pointer: Some(position),
        };
        let parent = self.parent_mutation();

        if !previous.is_empty() && previous == points {
            return vec![parent];
        }
        if !points.is_empty()
            && let Some(callback) = self.on_activated.as_mut()
        {
            callback(&points);
        }
        if !previous.is_empty()
            && let Some(callback) = self.on_deactivated.as_mut()
        {
            callback(&previous);
        }

        let mut mutations = vec![parent];
        for point in &previous {
            mutations.extend(self.point_mutations(point, false));
        }
        for point in &points {
            mutations.extend(self.point_mutations(point, true));
        }
        mutations
    }

    pub fn pointer_leave(&mut self) -> Vec<Mutation> {
        self.deactivate_all(None)
    }

    fn deactivate_all(&mut self, pointer: Option<Point>) -> Vec<Mutation> {
        let previous = std::mem::take(&mut self.state.active_points);
        self.state.pointer = pointer;
        if !previous.is_empty()
            && let Some(callback) = self.on_deactivated.as_mut()
        {
            callback(&previous);
        }
        let mut mutations = vec![self.parent_mutation()];
        for point in &previous {
            mutations.extend(self.point_mutations(point, false));
        }
        mutations
    }

    fn parent_mutation(&self) -> Mutation {
        Mutation::parent(StateChange::Voronoi {
            active_points: self.state.active_points.clone(),
            pointer: self.state.pointer,
        })
    }

    /// Data and label mutations for one point.
    ///
    /// Labels are targeted unless the container draws its own labels and
    /// label activation is off. Line-like series activate as a whole.
    fn point_mutations(&self, point: &VoronoiPoint, active: bool) -> Vec<Mutation> {
        let VoronoiProps {
            activate_data,
            activate_labels,
            labels,
            ..
        } = self.props;
        if !activate_data && !activate_labels {
            return Vec::new();
        }
        let change = |with_style: bool| {
            if !active {
                return StateChange::Deactivate;
            }
            StateChange::Activate {
                style: point
                    .style
                    .as_ref()
                    .filter(|_| with_style)
                    .map(|style| evaluate_style(style, &point.datum, true)),
            }
        };

        let mut mutations = Vec::with_capacity(2);
        if activate_data {
            let event_key = if point.continuous {
                EventKey::All
            } else {
                EventKey::Index(point.event_key())
            };
            mutations.push(Mutation::data(point.child_name.clone(), event_key, change(true)));
        }
        if !labels || activate_labels {
            mutations.push(Mutation::labels(
                point.child_name.clone(),
                EventKey::Index(point.event_key()),
                change(false),
            ));
        }
        mutations
    }
}

impl ContainerBehavior for VoronoiContainer {
    fn name(&self) -> &'static str {
        "voronoi"
    }

    fn gestures(&self) -> &'static [Gesture] {
        &[Gesture::PointerMove, Gesture::PointerLeave]
    }

    fn handle(&mut self, event: &ContainerEvent, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        match event {
            ContainerEvent::PointerMove(pointer) => {
                self.pointer_move(ctx, pointer.position, pointer.timestamp_ms)
            }
            ContainerEvent::PointerLeave(_) => self.pointer_leave(),
            _ => Vec::new(),
        }
    }
}
