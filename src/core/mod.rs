pub mod collection;
pub mod data;
pub mod domain;
pub mod legend;
pub mod plot;
pub mod props;
pub mod scale;
pub mod stack;
pub mod style;
pub mod tree;
pub mod types;
pub mod voronoi;

pub use data::{Accessor, DataAccessors, format_data};
pub use domain::{format_domain, get_domain, get_domain_with_zero};
pub use legend::{HeuristicTextMeasurer, LegendEntry, LegendLayout, LegendProps, TextMeasurer};
pub use plot::PlotContext;
pub use props::{ChartLayout, DomainProps, Padding, PaddingAmount, PerAxis, PixelBox};
pub use scale::{ContinuousScale, Scale, ScaleKind, ScalePair, compute_scale};
pub use stack::{StackOptions, compute_stacked_layout};
pub use style::{ResolvedStyle, StyleScalar, StyleSpec, StyleValue, evaluate_style};
pub use tree::{ChartTree, Node, NodeId, NodeRole, SeriesKind};
pub use types::{Axis, Datum, Domain, DomainBox, ErrorValue, Ohlc, Point, Value};
pub use voronoi::{Site, VoronoiDiagram, VoronoiPoint, VoronoiProps};
