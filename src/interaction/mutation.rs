use crate::core::style::ResolvedStyle;
use crate::core::types::Point;
use crate::core::voronoi::VoronoiPoint;
use crate::interaction::brush_container::BrushState;
use crate::interaction::brush_line::BrushLineState;
use crate::interaction::cursor_container::CursorState;
use crate::interaction::selection_container::SelectionState;
use crate::interaction::zoom_container::ZoomState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    Index(usize),
    /// Every datum of the series, used for line-like series.
    All,
}

/// Which rendered element a mutation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MutationTarget {
    Parent,
    Data {
        child_name: Option<String>,
        event_key: EventKey,
    },
    Labels {
        child_name: Option<String>,
        event_key: EventKey,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Mark the target active; `style` is the target's style resolved for
    /// the active state, when it has one.
    Activate { style: Option<ResolvedStyle> },
    /// Reset the target to its props.
    Deactivate,
    Voronoi {
        active_points: Vec<VoronoiPoint>,
        pointer: Option<Point>,
    },
    BrushLine(BrushLineState),
    Brush(BrushState),
    Selection(SelectionState),
    Zoom(ZoomState),
    Cursor(CursorState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub target: MutationTarget,
    pub change: StateChange,
}

impl Mutation {
    #[must_use]
    pub fn parent(change: StateChange) -> Self {
        Self {
            target: MutationTarget::Parent,
            change,
        }
    }

    #[must_use]
    pub fn data(child_name: Option<String>, event_key: EventKey, change: StateChange) -> Self {
        Self {
            target: MutationTarget::Data {
                child_name,
                event_key,
            },
            change,
        }
    }

    #[must_use]
    pub fn labels(child_name: Option<String>, event_key: EventKey, change: StateChange) -> Self {
        Self {
            target: MutationTarget::Labels {
                child_name,
                event_key,
            },
            change,
        }
    }

    #[must_use]
    pub fn is_parent(&self) -> bool {
        self.target == MutationTarget::Parent
    }
}
