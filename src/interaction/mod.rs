//! Pointer-driven container behaviors.
//!
//! Every behavior owns its interaction state, reacts to the events it
//! registered for and answers with an ordered list of [`Mutation`]s for the
//! host to apply. Nothing here schedules work or touches a rendering surface.

pub mod brush_container;
pub mod brush_line;
pub mod container;
pub mod cursor_container;
pub mod mutation;
pub mod rate_limiter;
pub mod selection_container;
pub mod voronoi_container;
pub mod zoom_container;

use serde::{Deserialize, Serialize};

use crate::core::types::Point;

pub use brush_container::{BrushContainer, BrushEdge, BrushProps, BrushState, DefaultBrushArea};
pub use brush_line::{ActiveBrushes, BrushHandle, BrushLine, BrushLineProps, BrushLineState};
pub use container::{ChildRender, Container, ContainerBehavior};
pub use cursor_container::{
    CursorContainer, CursorElements, CursorLine, CursorProps, CursorState, CursorValue,
    DefaultCursorValue,
};
pub use mutation::{EventKey, Mutation, MutationTarget, StateChange};
pub use rate_limiter::{GestureSequence, RateLimiter};
pub use selection_container::{SelectedData, SelectionContainer, SelectionProps, SelectionState};
pub use voronoi_container::{VoronoiContainer, VoronoiState};
pub use zoom_container::{ClipGroup, ZoomContainer, ZoomProps, ZoomState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// Pointer sample in the surface's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point,
    pub timestamp_ms: f64,
    #[serde(default)]
    pub source: PointerSource,
    /// Host-assigned id shared by duplicate dispatches of one physical event.
    #[serde(default)]
    pub sequence: Option<u64>,
}

impl PointerEvent {
    #[must_use]
    pub fn mouse(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self {
            position: Point::new(x, y),
            timestamp_ms,
            source: PointerSource::Mouse,
            sequence: None,
        }
    }

    #[must_use]
    pub fn touch(x: f64, y: f64, timestamp_ms: f64, sequence: u64) -> Self {
        Self {
            position: Point::new(x, y),
            timestamp_ms,
            source: PointerSource::Touch,
            sequence: Some(sequence),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    /// Positive values zoom out.
    pub delta_y: f64,
    pub timestamp_ms: f64,
}

impl WheelEvent {
    #[must_use]
    pub fn new(x: f64, y: f64, delta_y: f64, timestamp_ms: f64) -> Self {
        Self {
            position: Point::new(x, y),
            delta_y,
            timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    PointerEnter,
    PointerDown,
    PointerMove,
    PointerUp,
    PointerLeave,
    Wheel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ContainerEvent {
    PointerEnter(PointerEvent),
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    PointerLeave(PointerEvent),
    Wheel(WheelEvent),
}

impl ContainerEvent {
    #[must_use]
    pub fn gesture(&self) -> Gesture {
        match self {
            Self::PointerEnter(_) => Gesture::PointerEnter,
            Self::PointerDown(_) => Gesture::PointerDown,
            Self::PointerMove(_) => Gesture::PointerMove,
            Self::PointerUp(_) => Gesture::PointerUp,
            Self::PointerLeave(_) => Gesture::PointerLeave,
            Self::Wheel(_) => Gesture::Wheel,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        match self {
            Self::PointerEnter(event)
            | Self::PointerDown(event)
            | Self::PointerMove(event)
            | Self::PointerUp(event)
            | Self::PointerLeave(event) => event.position,
            Self::Wheel(event) => event.position,
        }
    }

    #[must_use]
    pub fn timestamp_ms(&self) -> f64 {
        match self {
            Self::PointerEnter(event)
            | Self::PointerDown(event)
            | Self::PointerMove(event)
            | Self::PointerUp(event)
            | Self::PointerLeave(event) => event.timestamp_ms,
            Self::Wheel(event) => event.timestamp_ms,
        }
    }
}
