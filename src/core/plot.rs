use std::f64::consts::TAU;

use crate::core::props::ChartLayout;
use crate::core::scale::ScalePair;
use crate::core::tree::{ChartTree, NodeId};
use crate::core::types::{Axis, DomainBox, Point};

/// Everything a hit-test or interaction needs to know about a rendered chart.
#[derive(Debug, Clone, Copy)]
pub struct PlotContext<'a> {
    pub tree: &'a ChartTree,
    pub children: &'a [NodeId],
    pub layout: &'a ChartLayout,
    pub scales: &'a ScalePair,
    pub domain: DomainBox,
}

impl<'a> PlotContext<'a> {
    #[must_use]
    pub fn new(
        tree: &'a ChartTree,
        children: &'a [NodeId],
        layout: &'a ChartLayout,
        scales: &'a ScalePair,
        domain: DomainBox,
    ) -> Self {
        Self {
            tree,
            children,
            layout,
            scales,
            domain,
        }
    }

    /// Pixel position of a data point.
    ///
    /// Horizontal charts swap screen axes; polar charts map x to the angle and
    /// y to the radius around the plot origin.
    #[must_use]
    pub fn scale_point(&self, x: f64, y: f64) -> Point {
        let sx = self.scales.x.apply(x);
        let sy = self.scales.y.apply(y);
        if self.layout.polar {
            let origin = self.layout.origin();
            return Point::new(origin.x + sy * sx.cos(), origin.y - sy * sx.sin());
        }
        if self.layout.horizontal {
            Point::new(sy, sx)
        } else {
            Point::new(sx, sy)
        }
    }

    /// Data coordinates under a pixel position; inverse of [`Self::scale_point`].
    #[must_use]
    pub fn data_coordinates(&self, point: Point) -> (f64, f64) {
        if self.layout.polar {
            let origin = self.layout.origin();
            let dx = point.x - origin.x;
            let dy = point.y - origin.y;
            let radius = dx.hypot(dy);
            let angle = (-dy.atan2(dx) + TAU) % TAU;
            return (self.scales.x.invert(angle), self.scales.y.invert(radius));
        }
        if self.layout.horizontal {
            (self.scales.x.invert(point.y), self.scales.y.invert(point.x))
        } else {
            (self.scales.x.invert(point.x), self.scales.y.invert(point.y))
        }
    }

    /// Pixel coordinate along the screen axis that carries data axis `axis`.
    #[must_use]
    pub fn pixel_on_axis(&self, axis: Axis, point: Point) -> f64 {
        point.get(axis.current(self.layout.horizontal))
    }
}
