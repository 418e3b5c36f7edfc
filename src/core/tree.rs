//! Arena of chart components and the aggregation helpers that walk it.
//!
//! Walks use an explicit work stack, so depth is bounded by the heap rather
//! than by the call stack.

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::collection::{max_f64, min_f64, uniq};
use crate::core::domain::{
    format_domain, get_domain, get_domain_from_data, get_domain_from_grouped_data,
    get_domain_from_min_max, get_domain_from_props, get_domain_with_zero,
};
use crate::core::props::{DomainProps, PaddingAmount};
use crate::core::stack::{StackOptions, compute_stacked_layout};
use crate::core::style::StyleSpec;
use crate::core::types::{Axis, Datum, Domain};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Line,
    Area,
    Bar,
    Scatter,
    Candlestick,
    ErrorBar,
    Voronoi,
}

impl SeriesKind {
    /// Line-like series are hit-tested as a continuum.
    #[must_use]
    pub fn continuous(self) -> bool {
        matches!(self, Self::Line | Self::Area)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Area => "area",
            Self::Bar => "bar",
            Self::Scatter => "scatter",
            Self::Candlestick => "candlestick",
            Self::ErrorBar => "errorbar",
            Self::Voronoi => "voronoi",
        }
    }

    /// Domain this kind of series occupies on `axis`.
    #[must_use]
    pub fn get_domain(self, props: &DomainProps, axis: Axis, data: &[Datum]) -> Option<Domain> {
        match self {
            Self::Bar | Self::Area => get_domain_with_zero(props, axis, data),
            Self::Candlestick if axis == Axis::Y => {
                get_domain(props, axis, &candle_extents(data))
            }
            Self::ErrorBar => get_domain(props, axis, &error_extents(data, axis)),
            _ => get_domain(props, axis, data),
        }
    }
}

fn candle_extents(data: &[Datum]) -> Cow<'_, [Datum]> {
    if data.iter().all(|datum| datum.ohlc.is_none()) {
        return Cow::Borrowed(data);
    }
    Cow::Owned(
        data.iter()
            .map(|datum| {
                let mut datum = datum.clone();
                if let Some(ohlc) = datum.ohlc {
                    datum.y0 = Some(ohlc.low);
                    datum.y1 = Some(ohlc.high);
                }
                datum
            })
            .collect(),
    )
}

fn error_extents(data: &[Datum], axis: Axis) -> Cow<'_, [Datum]> {
    let error = |datum: &Datum| match axis {
        Axis::X => datum.error_x,
        Axis::Y => datum.error_y,
    };
    if data.iter().all(|datum| error(datum).is_none()) {
        return Cow::Borrowed(data);
    }
    Cow::Owned(
        data.iter()
            .map(|datum| {
                let mut datum = datum.clone();
                if let Some(error) = error(&datum) {
                    let value = datum.get(axis);
                    let extent = (Some(value - error.negative()), Some(value + error.positive()));
                    match axis {
                        Axis::X => (datum.x0, datum.x1) = extent,
                        Axis::Y => (datum.y0, datum.y1) = extent,
                    }
                }
                datum
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role")]
pub enum NodeRole {
    Series { kind: SeriesKind },
    Stack,
    Group { offset: f64 },
    Axis { dependent: bool, tick_labels: Vec<String> },
    Container,
}

impl NodeRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Series { kind } => kind.as_str(),
            Self::Stack => "stack",
            Self::Group { .. } => "group",
            Self::Axis { .. } => "axis",
            Self::Container => "container",
        }
    }

    #[must_use]
    pub fn is_axis(&self) -> bool {
        matches!(self, Self::Axis { .. })
    }

    #[must_use]
    pub fn series_kind(&self) -> Option<SeriesKind> {
        match self {
            Self::Series { kind } => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub role: NodeRole,
    pub name: Option<String>,
    pub props: DomainProps,
    pub data: Vec<Datum>,
    pub style: Option<Arc<StyleSpec>>,
    children: Vec<NodeId>,
}

impl Node {
    fn with_role(role: NodeRole) -> Self {
        Self {
            role,
            name: None,
            props: DomainProps::default(),
            data: Vec::new(),
            style: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn series(kind: SeriesKind, data: Vec<Datum>) -> Self {
        Self {
            data,
            ..Self::with_role(NodeRole::Series { kind })
        }
    }

    #[must_use]
    pub fn stack() -> Self {
        Self::with_role(NodeRole::Stack)
    }

    #[must_use]
    pub fn group(offset: f64) -> Self {
        Self::with_role(NodeRole::Group { offset })
    }

    #[must_use]
    pub fn axis(dependent: bool, tick_labels: Vec<String>) -> Self {
        Self::with_role(NodeRole::Axis {
            dependent,
            tick_labels,
        })
    }

    #[must_use]
    pub fn container() -> Self {
        Self::with_role(NodeRole::Container)
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_props(mut self, props: DomainProps) -> Self {
        self.props = props;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: StyleSpec) -> Self {
        self.style = Some(Arc::new(style));
        self
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Series, stacks and groups carry data; axes and plain containers do not.
    #[must_use]
    pub fn is_data_component(&self) -> bool {
        matches!(
            self.role,
            NodeRole::Series { .. } | NodeRole::Stack | NodeRole::Group { .. }
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChartTree {
    nodes: Vec<Node>,
}

impl ChartTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node, typically a root.
    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn append_child(&mut self, parent: NodeId, node: Node) -> ChartResult<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(ChartError::InvalidData(format!(
                "parent node {} does not exist",
                parent.0
            )));
        }
        let id = self.add(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A leaf reached by [`reduce_children`].
#[derive(Debug, Clone)]
pub struct ChildVisit<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub name: String,
    pub parent: Option<NodeId>,
    /// Node props with the parent's shared settings applied.
    pub props: DomainProps,
    /// Node data, already stacked when the node sits inside a stack.
    pub data: Cow<'a, [Datum]>,
    pub stack_index: Option<usize>,
}

struct PendingVisit {
    id: NodeId,
    path: String,
    parent: Option<NodeId>,
    parent_props: DomainProps,
    data: Option<Vec<Datum>>,
    stack_index: Option<usize>,
}

/// Depth-first walk over the leaves below `roots`, in document order.
///
/// Nodes with children are descended into; the children of a stack receive
/// stacked data. Leaves are named by their `name` or `"{role}-{path}"`.
pub fn reduce_children<'a, T, F>(
    tree: &'a ChartTree,
    roots: &[NodeId],
    parent_props: &DomainProps,
    mut iteratee: F,
) -> Vec<T>
where
    F: FnMut(&ChildVisit<'a>) -> Option<T>,
{
    let mut results = Vec::new();
    let mut stack: Vec<PendingVisit> = roots
        .iter()
        .enumerate()
        .rev()
        .map(|(index, id)| PendingVisit {
            id: *id,
            path: index.to_string(),
            parent: None,
            parent_props: parent_props.clone(),
            data: None,
            stack_index: None,
        })
        .collect();

    while let Some(pending) = stack.pop() {
        let Some(node) = tree.node(pending.id) else {
            warn!(node = pending.id.0, "skipped unknown chart node");
            continue;
        };
        let props = node.props.inherit_from(&pending.parent_props);

        if node.children.is_empty() {
            let visit = ChildVisit {
                id: pending.id,
                node,
                name: node
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}", node.role.as_str(), pending.path)),
                parent: pending.parent,
                props,
                data: pending
                    .data
                    .map_or(Cow::Borrowed(node.data.as_slice()), Cow::Owned),
                stack_index: pending.stack_index,
            };
            if let Some(result) = iteratee(&visit) {
                results.push(result);
            }
            continue;
        }

        let mut stacked = if node.role == NodeRole::Stack {
            let datasets: Vec<Vec<Datum>> = node
                .children
                .iter()
                .filter_map(|child| tree.node(*child))
                .map(|child| child.data.clone())
                .collect();
            compute_stacked_layout(&datasets, StackOptions::default())
        } else {
            Vec::new()
        };

        let is_stack = node.role == NodeRole::Stack;
        for (index, child) in node.children.iter().enumerate().rev() {
            let data = if is_stack && index < stacked.len() {
                Some(std::mem::take(&mut stacked[index]))
            } else {
                None
            };
            stack.push(PendingVisit {
                id: *child,
                path: format!("{}-{index}", pending.path),
                parent: Some(pending.id),
                parent_props: props.clone(),
                data,
                stack_index: is_stack.then_some(index),
            });
        }
    }
    results
}

/// Datasets of all series below `roots`.
///
/// When any root is a stack, data are regrouped by index across series
/// (one dataset per position); otherwise one dataset per series.
#[must_use]
pub fn get_data_from_children(
    tree: &ChartTree,
    roots: &[NodeId],
    props: &DomainProps,
) -> Vec<Vec<Datum>> {
    let per_series: Vec<Vec<Datum>> = reduce_children(tree, roots, props, |visit| {
        visit
            .node
            .role
            .series_kind()
            .map(|_| visit.data.clone().into_owned())
    });
    let stacked = roots
        .iter()
        .filter_map(|id| tree.node(*id))
        .any(|node| node.role == NodeRole::Stack);
    if !stacked {
        return per_series;
    }

    let mut by_index: Vec<Vec<Datum>> = Vec::new();
    for dataset in per_series {
        for (index, datum) in dataset.into_iter().enumerate() {
            if by_index.len() <= index {
                by_index.resize_with(index + 1, Vec::new);
            }
            by_index[index].push(datum);
        }
    }
    by_index
}

/// Union of child domains on `axis`; `[0, 1]` when no child reports one.
///
/// A stack contributes the grouped domain of its children's raw data.
#[must_use]
pub fn get_domain_from_children(
    tree: &ChartTree,
    roots: &[NodeId],
    props: &DomainProps,
    axis: Axis,
) -> Domain {
    let mut domains = Vec::new();
    let mut pending: Vec<(NodeId, DomainProps)> =
        roots.iter().rev().map(|id| (*id, props.clone())).collect();
    while let Some((id, parent_props)) = pending.pop() {
        let Some(node) = tree.node(id) else {
            warn!(node = id.0, "skipped unknown chart node");
            continue;
        };
        let props = node.props.inherit_from(&parent_props);
        if node.role == NodeRole::Stack {
            let datasets: Vec<Vec<Datum>> = node
                .children
                .iter()
                .filter_map(|child| tree.node(*child))
                .map(|child| child.data.clone())
                .collect();
            domains.extend(get_domain_from_grouped_data(&props, axis, &datasets));
        } else if node.children.is_empty() {
            if let Some(kind) = node.role.series_kind() {
                domains.extend(kind.get_domain(&props, axis, &node.data));
            }
        } else {
            pending.extend(node.children.iter().rev().map(|child| (*child, props.clone())));
        }
    }
    let (Some(min), Some(max)) = (
        min_f64(domains.iter().map(|domain| domain.min())),
        max_f64(domains.iter().map(|domain| domain.max())),
    ) else {
        return Domain::unit();
    };
    let temporal = domains.iter().any(|domain| domain.temporal);
    get_domain_from_min_max(min, max, temporal)
}

/// String values on `axis` from categories, series data and axis tick labels.
#[must_use]
pub fn get_strings_from_children(
    tree: &ChartTree,
    roots: &[NodeId],
    props: &DomainProps,
    axis: Axis,
) -> Vec<String> {
    let from_children: Vec<Vec<String>> = reduce_children(tree, roots, props, |visit| {
        match &visit.node.role {
            NodeRole::Axis {
                dependent,
                tick_labels,
            } => {
                let labels_axis = if *dependent { Axis::Y } else { Axis::X };
                (labels_axis == axis).then(|| tick_labels.clone())
            }
            NodeRole::Series { .. } if axis == Axis::X => Some(
                visit
                    .data
                    .iter()
                    .filter_map(|datum| datum.x_name.clone())
                    .collect(),
            ),
            _ => None,
        }
    });
    uniq(
        props
            .categories(axis)
            .unwrap_or_default()
            .into_iter()
            .chain(from_children.into_iter().flatten()),
    )
}

/// Default x padding for grouped children: `offset * children / 2`.
///
/// Not applied to polar charts.
#[must_use]
pub fn get_default_domain_padding(
    tree: &ChartTree,
    roots: &[NodeId],
    props: &DomainProps,
) -> Option<f64> {
    if props.layout.polar {
        return None;
    }
    roots.iter().filter_map(|id| tree.node(*id)).find_map(|node| {
        match node.role {
            NodeRole::Group { offset } if offset > 0.0 && !node.children.is_empty() => {
                Some(offset * node.children.len() as f64 / 2.0)
            }
            _ => None,
        }
    })
}

/// Chart-level domain: explicit props, else the union of the chart's own
/// data and every child domain, then padded and cleaned.
#[must_use]
pub fn get_chart_domain(
    tree: &ChartTree,
    roots: &[NodeId],
    props: &DomainProps,
    own_data: &[Datum],
    axis: Axis,
) -> Domain {
    let mut props = Cow::Borrowed(props);
    if axis == Axis::X
        && props.domain_padding(axis).is_none()
        && let Some(padding) = get_default_domain_padding(tree, roots, &props)
    {
        props = Cow::Owned(
            props
                .into_owned()
                .with_axis_domain_padding(Axis::X, PaddingAmount::Uniform(padding)),
        );
    }

    let domain = get_domain_from_props(&props, axis).unwrap_or_else(|| {
        let data_domain = get_domain_from_data(&props, axis, own_data);
        let child_domain = (!roots.is_empty())
            .then(|| get_domain_from_children(tree, roots, &props, axis));
        let known: Vec<Domain> = data_domain.into_iter().chain(child_domain).collect();
        let min = props.min_domain(axis).map(|value| value.as_f64()).or_else(|| {
            min_f64(known.iter().map(|domain| domain.min()))
        });
        let max = props.max_domain(axis).map(|value| value.as_f64()).or_else(|| {
            max_f64(known.iter().map(|domain| domain.max()))
        });
        match (min, max) {
            (Some(min), Some(max)) => get_domain_from_min_max(
                min,
                max,
                known.iter().any(|domain| domain.temporal),
            ),
            _ => Domain::unit(),
        }
    });
    format_domain(domain, &props, axis)
}
