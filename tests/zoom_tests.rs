use std::cell::RefCell;
use std::rc::Rc;

use chart_layout::core::{
    Axis, ChartLayout, ChartTree, Datum, Domain, DomainBox, Node, NodeId, PerAxis, PixelBox,
    PlotContext, Point, ScaleKind, ScalePair, SeriesKind, compute_scale,
};
use chart_layout::interaction::zoom_container::{
    clip_groups, downsample, downsample_zoom_data, minimum_domain, pan_domain, scale_factor,
    scaled_domain,
};
use chart_layout::interaction::{ClipGroup, Container, ZoomContainer, ZoomProps};

fn scales(layout: &ChartLayout, domain: DomainBox) -> ScalePair {
    let scale = |axis: Axis| {
        compute_scale(domain.get(axis), layout.data_range(axis), ScaleKind::Linear)
            .expect("linear scale")
            .into_shared()
    };
    ScalePair::new(scale(Axis::X), scale(Axis::Y))
}

fn full() -> DomainBox {
    DomainBox::new(Domain::new(0.0, 10.0), Domain::new(0.0, 10.0))
}

const CENTER: Point = Point { x: 225.0, y: 150.0 };

fn assert_domain(actual: Domain, start: f64, end: f64) {
    assert!(
        (actual.start - start).abs() <= 1e-9 && (actual.end - end).abs() <= 1e-9,
        "expected [{start}, {end}], got [{}, {}]",
        actual.start,
        actual.end
    );
}

fn line(count: usize) -> Vec<Datum> {
    (0..count)
        .map(|index| Datum::new(index as f64, (index % 7) as f64).with_event_key(index))
        .collect()
}

#[test]
fn wheel_factor_is_bounded() {
    assert!((scale_factor(-100.0) - 2.0 / 3.0).abs() <= 1e-12);
    assert!((scale_factor(300.0) - 1.5).abs() <= 1e-12);
    assert!((scale_factor(-1_000.0) - 0.5).abs() <= 1e-12);
}

#[test]
fn scaling_keeps_the_anchor_fraction() {
    assert_domain(scaled_domain(Domain::new(0.0, 10.0), 0.5, 0.5), 2.5, 7.5);
    assert_domain(scaled_domain(Domain::new(0.0, 10.0), 0.5, 0.0), 0.0, 5.0);
}

#[test]
fn panning_is_clamped_to_the_original_domain() {
    let original = Domain::new(0.0, 10.0);
    assert_domain(pan_domain(Domain::new(2.0, 4.0), original, 1.0), 3.0, 5.0);
    assert_domain(pan_domain(Domain::new(2.0, 4.0), original, -5.0), 0.0, 2.0);
    assert_domain(pan_domain(Domain::new(2.0, 4.0), original, 10.0), 8.0, 10.0);
}

#[test]
fn minimum_domain_is_centered_on_the_point() {
    assert_domain(minimum_domain(5.0, Domain::new(0.0, 10.0), Some(1.0)), 4.5, 5.5);
    assert_domain(minimum_domain(5.0, Domain::new(0.0, 10.0), None), 4.995, 5.005);
}

#[test]
fn downsampling_keeps_a_power_of_two_stride() {
    let data = line(1_000);
    let sampled = downsample(&data, 50, 0);
    assert_eq!(sampled.len(), 32);
    assert!(sampled.iter().all(|datum| datum.event_key % 32 == 0));
    assert_eq!(downsample(&data[..10], 50, 0).len(), 10);
}

#[test]
fn zoomed_window_includes_one_point_past_each_edge() {
    let data = line(1_000);
    let sampled = downsample_zoom_data(&data, Domain::new(100.0, 200.0), Axis::X, 1_000);
    assert_eq!(sampled.len(), 103);
    assert_eq!(sampled[0].get(Axis::X), 99.0);
    assert_eq!(sampled[102].get(Axis::X), 201.0);

    let reduced = downsample_zoom_data(&data, Domain::new(100.0, 200.0), Axis::X, 50);
    assert!(reduced.len() <= 52);
    assert_eq!(reduced.first().map(|d| d.get(Axis::X)), Some(100.0));
    assert_eq!(reduced.last().map(|d| d.get(Axis::X)), Some(200.0));
}

#[test]
fn wheel_zooms_around_the_pointer() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, full());

    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let mut zoom = ZoomContainer::new(ZoomProps::default())
        .on_zoom_domain_change(move |domain| sink.borrow_mut().push(domain));

    zoom.wheel(&ctx, CENTER, -150.0, 0.0);
    let zoomed = zoom.state().current_domain.expect("zoomed domain");
    assert_domain(zoomed.x, 2.5, 7.5);
    assert_domain(zoomed.y, 2.5, 7.5);
    assert!(zoom.state().zoom_active);
    assert_eq!(changes.borrow().len(), 1);

    zoom.wheel(&ctx, CENTER, 300.0, 100.0);
    let widened = zoom.state().current_domain.expect("widened domain");
    assert_domain(widened.x, 1.25, 8.75);
}

#[test]
fn zooming_out_stops_at_the_original_domain() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, full());
    let mut zoom = ZoomContainer::new(ZoomProps::default());

    zoom.wheel(&ctx, CENTER, 300.0, 0.0);
    let domain = zoom.state().current_domain.expect("domain");
    assert_domain(domain.x, 0.0, 10.0);
    assert!(!zoom.state().zoom_active);
    assert_eq!(zoom.child_domain(&ctx), None);
}

#[test]
fn minimum_zoom_bounds_the_span() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, full());
    let mut zoom = ZoomContainer::new(
        ZoomProps::default()
            .with_dimension(Axis::X)
            .with_minimum_zoom(PerAxis::Both(4.0)),
    );

    for step in 0..5_u32 {
        zoom.wheel(&ctx, CENTER, -300.0, f64::from(step) * 100.0);
        let domain = zoom.state().current_domain.expect("domain");
        assert!(domain.x.span() >= 4.0 - 1e-9, "span {}", domain.x.span());
        assert_eq!(domain.y, full().y);
    }
}

#[test]
fn wheel_events_are_throttled_and_can_be_disabled() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, full());

    let mut zoom = ZoomContainer::new(ZoomProps::default());
    assert_eq!(zoom.wheel(&ctx, CENTER, -100.0, 0.0).len(), 1);
    assert!(zoom.wheel(&ctx, CENTER, -100.0, 5.0).is_empty());

    let mut disabled = ZoomContainer::new(ZoomProps::default().with_allow_zoom(false));
    assert!(disabled.wheel(&ctx, CENTER, -100.0, 0.0).is_empty());
}

#[test]
fn dragging_pans_the_zoomed_domain() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, full());

    let ended = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&ended);
    let mut zoom = ZoomContainer::new(ZoomProps::default())
        .on_zoom_domain_change_end(move || *sink.borrow_mut() += 1);

    zoom.wheel(&ctx, CENTER, -150.0, 0.0);
    zoom.pointer_down(CENTER);
    zoom.pointer_move(&ctx, Point::new(260.0, 150.0), 0.0);
    let panned = zoom.state().current_domain.expect("panned domain");
    assert_domain(panned.x, 2.0, 7.0);
    assert_domain(panned.y, 2.5, 7.5);

    zoom.pointer_move(&ctx, Point::new(1_000.0, 150.0), 100.0);
    assert_domain(zoom.state().current_domain.expect("clamped").x, 0.0, 5.0);

    zoom.pointer_up();
    assert_eq!(*ended.borrow(), 1);
    assert!(!zoom.state().panning);
}

#[test]
fn host_domain_takes_over_when_changed() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, full());
    let mut zoom = ZoomContainer::new(ZoomProps::default());

    let host = DomainBox::new(Domain::new(5.0, 6.0), Domain::new(0.0, 10.0));
    zoom.set_zoom_domain(Some(host));
    assert_eq!(zoom.child_domain(&ctx), Some(host));
}

#[test]
fn children_get_the_zoomed_domain_and_downsampled_data() {
    let mut tree = ChartTree::new();
    let series = tree.add(Node::series(SeriesKind::Line, line(1_000)).named("line"));
    let axis = tree.add(Node::axis(false, Vec::new()));
    let roots = [series, axis];
    let domain = DomainBox::new(Domain::new(0.0, 999.0), Domain::new(0.0, 6.0));
    let layout = ChartLayout::default();
    let scales = scales(&layout, domain);
    let ctx = PlotContext::new(&tree, &roots, &layout, &scales, domain);

    let visible = DomainBox::new(Domain::new(100.0, 200.0), Domain::new(0.0, 6.0));
    let mut zoom = ZoomContainer::new(ZoomProps::default().with_downsample(50));
    zoom.set_zoom_domain(Some(visible));
    let children = Container::new().with_behavior(zoom).children(&ctx);

    assert_eq!(children.len(), 2);
    assert_eq!(children[0].domain, Some(visible));
    let data = children[0].data.as_ref().expect("downsampled data");
    assert!(data.len() <= 52);
    assert!(data.windows(2).all(|pair| pair[0].get(Axis::X) <= pair[1].get(Axis::X)));
    assert_eq!(children[1].data, None);
    assert_eq!(children[1].name, "axis-1");
}

#[test]
fn axes_split_children_into_clip_groups() {
    let mut tree = ChartTree::new();
    let ids: Vec<NodeId> = vec![
        tree.add(Node::series(SeriesKind::Line, line(3))),
        tree.add(Node::series(SeriesKind::Scatter, line(3))),
        tree.add(Node::axis(false, Vec::new())),
        tree.add(Node::axis(true, Vec::new())),
        tree.add(Node::series(SeriesKind::Bar, line(3))),
    ];
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &ids, &layout, &scales, full());

    let bounds = PixelBox::new(50.0, 50.0, 400.0, 250.0);
    assert_eq!(
        clip_groups(&ctx),
        vec![
            ClipGroup::Clipped {
                bounds,
                radius: None,
                children: vec![ids[0], ids[1]],
            },
            ClipGroup::Axis(ids[2]),
            ClipGroup::Axis(ids[3]),
            ClipGroup::Clipped {
                bounds,
                radius: None,
                children: vec![ids[4]],
            },
        ]
    );
}

#[test]
fn pointer_left_of_the_plot_anchors_before_the_domain() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, full());
    let mut zoom = ZoomContainer::new(ZoomProps::default().with_dimension(Axis::X));

    // x = 15 px inverts to -1, a tenth of the span before the start.
    zoom.wheel(&ctx, Point::new(15.0, 150.0), -150.0, 0.0);
    let domain = zoom.state().current_domain.expect("zoomed domain");
    assert_domain(domain.x, 0.0, 4.5);
    assert_domain(domain.y, 0.0, 10.0);
}
