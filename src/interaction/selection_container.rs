//! Marquee selection of data points.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::plot::PlotContext;
use crate::core::props::{DomainProps, PixelBox};
use crate::core::tree::reduce_children;
use crate::core::types::{Axis, Datum, DomainBox, Point};
use crate::interaction::brush_container::domain_from_box;
use crate::interaction::container::ContainerBehavior;
use crate::interaction::mutation::{EventKey, Mutation, StateChange};
use crate::interaction::rate_limiter::RateLimiter;
use crate::interaction::{ContainerEvent, Gesture};

pub const SELECTION_THROTTLE_MS: f64 = 16.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionProps {
    /// `None` selects along both dimensions.
    #[serde(default)]
    pub selection_dimension: Option<Axis>,
    #[serde(default = "default_true")]
    pub allow_selection: bool,
    /// Series names never selected; a trailing `*` matches a prefix.
    #[serde(default)]
    pub selection_blacklist: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for SelectionProps {
    fn default() -> Self {
        Self {
            selection_dimension: None,
            allow_selection: true,
            selection_blacklist: Vec::new(),
        }
    }
}

impl SelectionProps {
    #[must_use]
    pub fn with_dimension(mut self, dimension: Axis) -> Self {
        self.selection_dimension = Some(dimension);
        self
    }

    #[must_use]
    pub fn with_allow_selection(mut self, allow: bool) -> Self {
        self.allow_selection = allow;
        self
    }

    #[must_use]
    pub fn with_blacklist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection_blacklist = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.selection_blacklist
            .iter()
            .any(|pattern| match pattern.strip_suffix('*') {
                Some(prefix) => name.starts_with(prefix),
                None => pattern == name,
            })
    }
}

/// Data selected from one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedData {
    pub child_name: String,
    pub event_keys: Vec<usize>,
    pub data: Vec<Datum>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    /// A marquee is being drawn.
    pub select: bool,
    pub selection: Option<PixelBox>,
    pub selected: Vec<SelectedData>,
}

/// Series data whose scaled position lies inside `bounds`.
#[must_use]
pub fn select_data_in_bounds(
    ctx: &PlotContext<'_>,
    props: &SelectionProps,
    bounds: PixelBox,
) -> Vec<SelectedData> {
    let parent_props = DomainProps::new(*ctx.layout);
    reduce_children(ctx.tree, ctx.children, &parent_props, |visit| {
        visit.node.role.series_kind()?;
        if props.is_blacklisted(&visit.name) {
            return None;
        }
        let data: Vec<Datum> = visit
            .data
            .iter()
            .filter(|datum| {
                let x = datum.x1.unwrap_or_else(|| datum.get(Axis::X));
                let y = datum.y1.unwrap_or_else(|| datum.get(Axis::Y));
                bounds.contains(ctx.scale_point(x, y), 0.0)
            })
            .cloned()
            .collect();
        if data.is_empty() {
            return None;
        }
        Some(SelectedData {
            child_name: visit.name.clone(),
            event_keys: data.iter().map(|datum| datum.event_key).collect(),
            data,
        })
    })
}

type SelectionCallback = Box<dyn FnMut(&[SelectedData], DomainBox)>;
type ClearedCallback = Box<dyn FnMut()>;

pub struct SelectionContainer {
    props: SelectionProps,
    state: SelectionState,
    limiter: RateLimiter,
    on_selection: Option<SelectionCallback>,
    on_selection_cleared: Option<ClearedCallback>,
}

impl fmt::Debug for SelectionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionContainer")
            .field("props", &self.props)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SelectionContainer {
    #[must_use]
    pub fn new(props: SelectionProps) -> Self {
        Self {
            props,
            state: SelectionState::default(),
            limiter: RateLimiter::new(SELECTION_THROTTLE_MS),
            on_selection: None,
            on_selection_cleared: None,
        }
    }

    #[must_use]
    pub fn on_selection(mut self, callback: impl FnMut(&[SelectedData], DomainBox) + 'static) -> Self {
        self.on_selection = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_selection_cleared(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_selection_cleared = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    fn selected_mutations(&self, change: &StateChange) -> impl Iterator<Item = Mutation> + '_ {
        let change = change.clone();
        self.state.selected.iter().flat_map(move |selected| {
            let change = change.clone();
            selected.event_keys.iter().map(move |key| {
                Mutation::data(
                    Some(selected.child_name.clone()),
                    EventKey::Index(*key),
                    change.clone(),
                )
            })
        })
    }

    pub fn pointer_down(&mut self, ctx: &PlotContext<'_>, point: Point) -> Vec<Mutation> {
        if !self.props.allow_selection {
            return Vec::new();
        }
        let plot = ctx.layout.plot_bounds();
        let (select_x, select_y) = match self
            .props
            .selection_dimension
            .map(|axis| axis.current(ctx.layout.horizontal))
        {
            _ if ctx.layout.polar => (true, true),
            None => (true, true),
            Some(Axis::X) => (true, false),
            Some(Axis::Y) => (false, true),
        };
        let selection = PixelBox {
            x1: if select_x { point.x } else { plot.min_x() },
            x2: if select_x { point.x } else { plot.max_x() },
            y1: if select_y { point.y } else { plot.min_y() },
            y2: if select_y { point.y } else { plot.max_y() },
        };

        let mut mutations = Vec::new();
        if !self.state.selected.is_empty() {
            if let Some(callback) = self.on_selection_cleared.as_mut() {
                callback();
            }
            mutations.extend(self.selected_mutations(&StateChange::Deactivate));
        }
        self.limiter.reset();
        self.state = SelectionState {
            select: true,
            selection: Some(selection),
            selected: Vec::new(),
        };
        mutations.insert(0, Mutation::parent(StateChange::Selection(self.state.clone())));
        mutations
    }

    pub fn pointer_move(&mut self, ctx: &PlotContext<'_>, point: Point, timestamp_ms: f64) -> Vec<Mutation> {
        if !self.state.select {
            return Vec::new();
        }
        if !self.limiter.try_acquire(timestamp_ms) {
            trace!(timestamp_ms, "throttled selection move");
            return Vec::new();
        }
        let Some(selection) = self.state.selection.as_mut() else {
            return Vec::new();
        };
        let dimension = self
            .props
            .selection_dimension
            .filter(|_| !ctx.layout.polar)
            .map(|axis| axis.current(ctx.layout.horizontal));
        if dimension != Some(Axis::Y) {
            selection.x2 = point.x;
        }
        if dimension != Some(Axis::X) {
            selection.y2 = point.y;
        }
        vec![Mutation::parent(StateChange::Selection(self.state.clone()))]
    }

    pub fn pointer_up(&mut self, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        if !self.state.select {
            return Vec::new();
        }
        self.state.select = false;
        let Some(selection) = self.state.selection.take() else {
            return vec![Mutation::parent(StateChange::Selection(self.state.clone()))];
        };
        if selection.width() == 0.0 || selection.height() == 0.0 {
            return vec![Mutation::parent(StateChange::Selection(self.state.clone()))];
        }

        self.state.selected = select_data_in_bounds(ctx, &self.props, selection);
        let bounds = domain_from_box(ctx, self.props.selection_dimension, selection);
        debug!(
            series = self.state.selected.len(),
            points = self.state.selected.iter().map(|s| s.event_keys.len()).sum::<usize>(),
            "selection finished"
        );
        if let Some(callback) = self.on_selection.as_mut() {
            callback(&self.state.selected, bounds);
        }

        let mut mutations = vec![Mutation::parent(StateChange::Selection(self.state.clone()))];
        mutations.extend(self.selected_mutations(&StateChange::Activate { style: None }));
        mutations
    }
}

impl ContainerBehavior for SelectionContainer {
    fn name(&self) -> &'static str {
        "selection"
    }

    fn gestures(&self) -> &'static [Gesture] {
        &[Gesture::PointerDown, Gesture::PointerMove, Gesture::PointerUp]
    }

    fn handle(&mut self, event: &ContainerEvent, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        match event {
            ContainerEvent::PointerDown(pointer) => self.pointer_down(ctx, pointer.position),
            ContainerEvent::PointerMove(pointer) => {
                self.pointer_move(ctx, pointer.position, pointer.timestamp_ms)
            }
            ContainerEvent::PointerUp(_) => self.pointer_up(ctx),
            _ => Vec::new(),
        }
    }
}
