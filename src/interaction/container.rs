//! Composition of interactive behaviors over one chart surface.

use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use crate::core::plot::PlotContext;
use crate::core::tree::NodeId;
use crate::core::types::{Datum, DomainBox};
use crate::interaction::mutation::Mutation;
use crate::interaction::{ContainerEvent, Gesture};

/// Props a container hands down to one of its direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRender {
    pub id: NodeId,
    pub name: String,
    /// Domain override; `None` keeps the child's own domain.
    pub domain: Option<DomainBox>,
    /// Data override, e.g. a downsampled slice.
    pub data: Option<Vec<Datum>>,
}

/// One interactive behavior (voronoi, brush, zoom, cursor, ...).
pub trait ContainerBehavior {
    fn name(&self) -> &'static str;

    /// Gestures this behavior listens to.
    fn gestures(&self) -> &'static [Gesture];

    fn handle(&mut self, event: &ContainerEvent, ctx: &PlotContext<'_>) -> Vec<Mutation>;

    fn modify_children(&self, _ctx: &PlotContext<'_>, children: Vec<ChildRender>) -> Vec<ChildRender> {
        children
    }
}

/// Behaviors composed over one surface, dispatched in registration order.
#[derive(Default)]
pub struct Container {
    behaviors: Vec<Box<dyn ContainerBehavior>>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field(
                "behaviors",
                &self.behaviors.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_behavior<B>(mut self, behavior: B) -> Self
    where
        B: ContainerBehavior + 'static,
    {
        self.behaviors.push(Box::new(behavior));
        self
    }

    pub fn push(&mut self, behavior: Box<dyn ContainerBehavior>) {
        self.behaviors.push(behavior);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Routes `event` to every behavior registered for its gesture and
    /// concatenates their mutations.
    pub fn dispatch(&mut self, event: &ContainerEvent, ctx: &PlotContext<'_>) -> Vec<Mutation> {
        let gesture = event.gesture();
        let mut mutations = Vec::new();
        for behavior in &mut self.behaviors {
            if behavior.gestures().contains(&gesture) {
                let produced = behavior.handle(event, ctx);
                trace!(
                    behavior = behavior.name(),
                    ?gesture,
                    mutations = produced.len(),
                    "dispatched container event"
                );
                mutations.extend(produced);
            }
        }
        mutations
    }

    /// Gesture name to the behaviors listening for it.
    #[must_use]
    pub fn event_table(&self) -> IndexMap<Gesture, Vec<&'static str>> {
        let mut table: IndexMap<Gesture, Vec<&'static str>> = IndexMap::new();
        for behavior in &self.behaviors {
            for gesture in behavior.gestures() {
                table.entry(*gesture).or_default().push(behavior.name());
            }
        }
        table.sort_keys();
        table
    }

    /// Direct children of the surface, passed through each behavior in turn.
    #[must_use]
    pub fn children(&self, ctx: &PlotContext<'_>) -> Vec<ChildRender> {
        let initial = ctx
            .children
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let node = ctx.tree.node(*id)?;
                Some(ChildRender {
                    id: *id,
                    name: node
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("{}-{index}", node.role.as_str())),
                    domain: None,
                    data: None,
                })
            })
            .collect();
        self.behaviors
            .iter()
            .fold(initial, |children, behavior| behavior.modify_children(ctx, children))
    }
}
