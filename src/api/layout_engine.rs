use tracing::debug;

use crate::core::domain::get_domain;
use crate::core::legend::{LegendEntry, LegendLayout, TextMeasurer, legend_layout};
use crate::core::plot::PlotContext;
use crate::core::props::{ChartLayout, DomainProps};
use crate::core::scale::{ContinuousScale, ScaleKind, ScalePair, compute_scale};
use crate::core::stack::compute_stacked_layout;
use crate::core::tree::{ChartTree, NodeId, get_chart_domain};
use crate::core::types::{Axis, Datum, Domain, DomainBox, Point};
use crate::core::voronoi::{Site, find_nearest_site};
use crate::error::ChartResult;

use super::LayoutEngineConfig;

/// Host-facing entry point bundling one chart's settings with the pure
/// layout functions.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEngine {
    config: LayoutEngineConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutEngineConfig) -> ChartResult<Self> {
        config.validate()?;
        debug!(
            width = config.layout.width,
            height = config.layout.height,
            polar = config.layout.polar,
            horizontal = config.layout.horizontal,
            "layout engine created"
        );
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &LayoutEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &ChartLayout {
        &self.config.layout
    }

    /// Domain props bound to this engine's surface.
    #[must_use]
    pub fn domain_props(&self) -> DomainProps {
        DomainProps::new(self.config.layout)
    }

    /// Padded, cleaned domain of `data` on `axis`; `[0, 1]` when the data
    /// yields none.
    #[must_use]
    pub fn compute_domain(&self, props: &DomainProps, axis: Axis, data: &[Datum]) -> Domain {
        get_domain(props, axis, data).unwrap_or_else(Domain::unit)
    }

    /// Chart-level domain over the chart's own data and its children.
    #[must_use]
    pub fn compute_chart_domain(
        &self,
        tree: &ChartTree,
        roots: &[NodeId],
        props: &DomainProps,
        own_data: &[Datum],
    ) -> DomainBox {
        DomainBox::new(
            get_chart_domain(tree, roots, props, own_data, Axis::X),
            get_chart_domain(tree, roots, props, own_data, Axis::Y),
        )
    }

    pub fn compute_scale(
        &self,
        domain: Domain,
        range: (f64, f64),
        kind: ScaleKind,
    ) -> ChartResult<ContinuousScale> {
        compute_scale(domain, range, kind)
    }

    /// Scales for both axes over this engine's surface, with the scale kind
    /// each axis declares in `props`.
    pub fn compute_scales(&self, props: &DomainProps, domain: DomainBox) -> ChartResult<ScalePair> {
        let layout = &self.config.layout;
        let scale = |axis: Axis| {
            compute_scale(domain.get(axis), layout.data_range(axis), props.scale_kind(axis))
                .map(ContinuousScale::into_shared)
        };
        Ok(ScalePair::new(scale(Axis::X)?, scale(Axis::Y)?))
    }

    #[must_use]
    pub fn compute_stacked_layout(&self, datasets: &[Vec<Datum>]) -> Vec<Vec<Datum>> {
        compute_stacked_layout(datasets, self.config.stack)
    }

    /// Site nearest to `pointer` under this engine's voronoi settings.
    #[must_use]
    pub fn find_nearest_site(
        &self,
        ctx: &PlotContext<'_>,
        data: Option<&[Datum]>,
        pointer: Point,
    ) -> Option<Site> {
        find_nearest_site(ctx, &self.config.voronoi, data, pointer)
    }

    #[must_use]
    pub fn legend_layout(&self, entries: &[LegendEntry], measurer: &dyn TextMeasurer) -> LegendLayout {
        legend_layout(entries, &self.config.legend, measurer)
    }
}
