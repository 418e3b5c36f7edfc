//! chart-layout: domain, scale, stacking, hit-testing and interaction-state
//! engine for declarative charts.
//!
//! The crate owns no rendering surface. Hosts describe a chart as a tree of
//! series, ask for domains, scales and stacked data, and feed pointer events
//! into container behaviors that answer with mutations to apply.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod telemetry;

pub use api::{LayoutEngine, LayoutEngineConfig};
pub use error::{ChartError, ChartResult};
