//! Nearest-point hit testing over scaled data.
//!
//! Data from every series is flattened, projected to pixels and bucketed by
//! exact pixel position into [`Site`]s. Lookups then pick the nearest site,
//! optionally within a radius.

use std::sync::Arc;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::plot::PlotContext;
use crate::core::props::{DomainProps, Padding, PixelBox};
use crate::core::style::StyleSpec;
use crate::core::tree::reduce_children;
use crate::core::types::{Axis, Datum, Point};

#[cfg(feature = "parallel-projection")]
const PARALLEL_PROJECTION_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoronoiProps {
    /// Restricts hit testing to one axis; the radius is then ignored.
    #[serde(default)]
    pub voronoi_dimension: Option<Axis>,
    #[serde(default)]
    pub radius: Option<f64>,
    /// Bounds inset; defaults to the chart padding.
    #[serde(default)]
    pub voronoi_padding: Option<Padding>,
    /// Series names to ignore. A trailing `*` matches by prefix.
    #[serde(default)]
    pub voronoi_blacklist: Vec<String>,
    #[serde(default = "default_true")]
    pub activate_data: bool,
    #[serde(default = "default_true")]
    pub activate_labels: bool,
    /// Whether the container renders its own labels.
    #[serde(default)]
    pub labels: bool,
}

fn default_true() -> bool {
    true
}

impl Default for VoronoiProps {
    fn default() -> Self {
        Self {
            voronoi_dimension: None,
            radius: None,
            voronoi_padding: None,
            voronoi_blacklist: Vec::new(),
            activate_data: true,
            activate_labels: true,
            labels: false,
        }
    }
}

impl VoronoiProps {
    #[must_use]
    pub fn with_dimension(mut self, axis: Axis) -> Self {
        self.voronoi_dimension = Some(axis);
        self
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.voronoi_padding = Some(padding);
        self
    }

    #[must_use]
    pub fn with_blacklist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.voronoi_blacklist = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.voronoi_blacklist
            .iter()
            .any(|pattern| match pattern.strip_suffix('*') {
                Some(prefix) => name.starts_with(prefix),
                None => pattern == name,
            })
    }
}

/// A datum annotated with where and how it is hit tested.
#[derive(Debug, Clone)]
pub struct VoronoiPoint {
    pub datum: Datum,
    pub voronoi_x: f64,
    pub voronoi_y: f64,
    pub child_name: Option<String>,
    /// The owning series is line-like.
    pub continuous: bool,
    pub style: Option<Arc<StyleSpec>>,
}

impl VoronoiPoint {
    #[must_use]
    pub fn event_key(&self) -> usize {
        self.datum.event_key
    }
}

impl PartialEq for VoronoiPoint {
    fn eq(&self, other: &Self) -> bool {
        self.child_name == other.child_name
            && self.continuous == other.continuous
            && self.datum == other.datum
    }
}

/// Pixel bucket shared by every point projected onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub x: f64,
    pub y: f64,
    pub points: SmallVec<[VoronoiPoint; 2]>,
}

impl Site {
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Flattens the explicit `data`, or every non-blacklisted child series, into
/// annotated points.
#[must_use]
pub fn get_datasets(
    ctx: &PlotContext<'_>,
    props: &VoronoiProps,
    data: Option<&[Datum]>,
) -> Vec<VoronoiPoint> {
    let annotate = |datum: &Datum,
                    child_name: Option<&str>,
                    continuous: bool,
                    style: Option<&Arc<StyleSpec>>| {
        VoronoiPoint {
            datum: datum.clone(),
            voronoi_x: if props.voronoi_dimension == Some(Axis::Y) {
                ctx.domain.x.min()
            } else {
                datum.midpoint(Axis::X)
            },
            voronoi_y: if props.voronoi_dimension == Some(Axis::X) {
                ctx.domain.y.min()
            } else {
                datum.midpoint(Axis::Y)
            },
            child_name: child_name.map(str::to_owned),
            continuous,
            style: style.cloned(),
        }
    };

    if let Some(data) = data {
        return data
            .iter()
            .map(|datum| annotate(datum, None, false, None))
            .collect();
    }

    let parent_props = DomainProps::new(*ctx.layout);
    let points: Vec<Vec<VoronoiPoint>> =
        reduce_children(ctx.tree, ctx.children, &parent_props, |visit| {
            let kind = visit.node.role.series_kind()?;
            if props.is_blacklisted(&visit.name) {
                debug!(child = %visit.name, "skipped blacklisted series");
                return None;
            }
            Some(
                visit
                    .data
                    .iter()
                    .map(|datum| {
                        annotate(
                            datum,
                            Some(visit.name.as_str()),
                            kind.continuous(),
                            visit.node.style.as_ref(),
                        )
                    })
                    .collect(),
            )
        });
    points.into_iter().flatten().collect()
}

#[cfg(feature = "parallel-projection")]
fn project(ctx: &PlotContext<'_>, points: &[VoronoiPoint]) -> Vec<Point> {
    use rayon::prelude::*;

    if points.len() < PARALLEL_PROJECTION_THRESHOLD {
        return project_serial(ctx, points);
    }
    points
        .par_iter()
        .map(|point| ctx.scale_point(point.voronoi_x, point.voronoi_y))
        .collect()
}

#[cfg(not(feature = "parallel-projection"))]
fn project(ctx: &PlotContext<'_>, points: &[VoronoiPoint]) -> Vec<Point> {
    project_serial(ctx, points)
}

fn project_serial(ctx: &PlotContext<'_>, points: &[VoronoiPoint]) -> Vec<Point> {
    points
        .iter()
        .map(|point| ctx.scale_point(point.voronoi_x, point.voronoi_y))
        .collect()
}

/// Buckets points by their exact projected pixel position, first-seen order.
#[must_use]
pub fn merge_datasets(ctx: &PlotContext<'_>, points: Vec<VoronoiPoint>) -> Vec<Site> {
    let pixels = project(ctx, &points);
    let mut sites: IndexMap<String, Site> = IndexMap::with_capacity(points.len());
    for (point, pixel) in points.into_iter().zip(pixels) {
        sites
            .entry(format!("{},{}", pixel.x, pixel.y))
            .or_insert_with(|| Site {
                x: pixel.x,
                y: pixel.y,
                points: SmallVec::new(),
            })
            .points
            .push(point);
    }
    sites.into_values().collect()
}

fn padding(ctx: &PlotContext<'_>, props: &VoronoiProps) -> Padding {
    props.voronoi_padding.unwrap_or(ctx.layout.padding)
}

/// Rectangle hit testing is clipped to.
#[must_use]
pub fn voronoi_extent(ctx: &PlotContext<'_>, props: &VoronoiProps) -> PixelBox {
    let padding = padding(ctx, props);
    PixelBox::new(
        padding.left,
        padding.top,
        ctx.layout.width - padding.right,
        ctx.layout.height - padding.bottom,
    )
}

#[must_use]
pub fn within_bounds(ctx: &PlotContext<'_>, props: &VoronoiProps, point: Point) -> bool {
    if ctx.layout.polar {
        let (start, end) = ctx.scales.y.range();
        let radius = start.max(end);
        return point.distance_squared(ctx.layout.origin()) < radius * radius;
    }
    voronoi_extent(ctx, props).contains(point, 0.0)
}

/// Voronoi tessellation of a set of sites inside a rectangle.
#[derive(Debug, Clone)]
pub struct VoronoiDiagram {
    sites: Vec<Point>,
    extent: PixelBox,
}

impl VoronoiDiagram {
    #[must_use]
    pub fn new(sites: Vec<Point>, extent: PixelBox) -> Self {
        Self { sites, extent }
    }

    #[must_use]
    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Index of the site nearest to `point`; ties go to the lowest index.
    ///
    /// With a radius, a site only matches when strictly closer than it.
    #[must_use]
    pub fn find(&self, point: Point, radius: Option<f64>) -> Option<usize> {
        let (index, distance_squared) = self
            .sites
            .iter()
            .map(|site| site.distance_squared(point))
            .enumerate()
            .min_by_key(|(_, distance)| OrderedFloat(*distance))?;
        match radius {
            Some(radius) if distance_squared >= radius * radius => None,
            _ => Some(index),
        }
    }

    /// Cell polygon of site `index`, clipped to the extent.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<Vec<Point>> {
        let site = *self.sites.get(index)?;
        let extent = self.extent;
        let mut polygon = vec![
            Point::new(extent.min_x(), extent.min_y()),
            Point::new(extent.max_x(), extent.min_y()),
            Point::new(extent.max_x(), extent.max_y()),
            Point::new(extent.min_x(), extent.max_y()),
        ];
        for (other_index, other) in self.sites.iter().enumerate() {
            if other_index == index || *other == site {
                continue;
            }
            polygon = clip_half_plane(&polygon, site, *other);
            if polygon.is_empty() {
                break;
            }
        }
        Some(polygon)
    }
}

/// Keeps the part of `polygon` closer to `site` than to `other`.
fn clip_half_plane(polygon: &[Point], site: Point, other: Point) -> Vec<Point> {
    let normal = Point::new(other.x - site.x, other.y - site.y);
    let mid = Point::new((site.x + other.x) / 2.0, (site.y + other.y) / 2.0);
    let side = |p: Point| (p.x - mid.x) * normal.x + (p.y - mid.y) * normal.y;

    let mut clipped = Vec::with_capacity(polygon.len() + 1);
    for (index, current) in polygon.iter().enumerate() {
        let next = polygon[(index + 1) % polygon.len()];
        let (current_side, next_side) = (side(*current), side(next));
        if current_side <= 0.0 {
            clipped.push(*current);
        }
        if (current_side < 0.0 && next_side > 0.0) || (current_side > 0.0 && next_side < 0.0) {
            let t = current_side / (current_side - next_side);
            clipped.push(Point::new(
                current.x + t * (next.x - current.x),
                current.y + t * (next.y - current.y),
            ));
        }
    }
    clipped
}

/// Site under `pointer`, or `None` when nothing is in reach.
#[must_use]
pub fn get_voronoi(
    ctx: &PlotContext<'_>,
    props: &VoronoiProps,
    sites: &[Site],
    pointer: Point,
) -> Option<Site> {
    let diagram = VoronoiDiagram::new(
        sites.iter().map(Site::position).collect(),
        voronoi_extent(ctx, props),
    );
    let radius = if props.voronoi_dimension.is_some() {
        None
    } else {
        props.radius
    };
    let found = diagram.find(pointer, radius);
    trace!(sites = diagram.len(), ?found, "voronoi lookup");
    found.and_then(|index| sites.get(index).cloned())
}

/// Full lookup from a pointer position: bounds check, flatten, merge, find.
#[must_use]
pub fn find_nearest_site(
    ctx: &PlotContext<'_>,
    props: &VoronoiProps,
    data: Option<&[Datum]>,
    pointer: Point,
) -> Option<Site> {
    if !within_bounds(ctx, props, pointer) {
        return None;
    }
    let sites = merge_datasets(ctx, get_datasets(ctx, props, data));
    get_voronoi(ctx, props, &sites, pointer)
}
