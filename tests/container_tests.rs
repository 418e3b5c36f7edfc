use chart_layout::core::{
    Axis, ChartLayout, ChartTree, Datum, Domain, DomainBox, Node, PlotContext, ScaleKind,
    ScalePair, SeriesKind, VoronoiProps, compute_scale,
};
use chart_layout::interaction::{
    Container, ContainerEvent, CursorContainer, CursorProps, Gesture, GestureSequence,
    PointerEvent, RateLimiter, StateChange, VoronoiContainer, WheelEvent, ZoomContainer,
    ZoomProps,
};

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

#[test]
fn rate_limiter_drops_events_inside_the_window() {
    let mut limiter = RateLimiter::new(16.0);
    assert!(limiter.try_acquire(0.0));
    assert!(!limiter.try_acquire(10.0));
    assert!(limiter.has_pending());
    assert_eq!(limiter.dropped(), 1);

    assert!(limiter.try_acquire(16.0));
    assert!(!limiter.has_pending());

    limiter.reset();
    assert!(limiter.try_acquire(17.0));
    assert_eq!(limiter.dropped(), 1);
}

#[test]
fn rate_limiter_accepts_clock_resets() {
    let mut limiter = RateLimiter::new(32.0);
    assert!(limiter.try_acquire(1_000.0));
    assert!(limiter.try_acquire(5.0));

    let mut unthrottled = RateLimiter::new(-5.0);
    assert_eq!(unthrottled.interval_ms(), 0.0);
    assert!(unthrottled.try_acquire(1.0));
    assert!(unthrottled.try_acquire(1.0));
}

#[test]
fn gesture_sequence_rejects_stale_ids() {
    let mut sequence = GestureSequence::new();
    assert!(sequence.accept(None));
    assert!(sequence.accept(Some(3)));
    assert!(!sequence.accept(Some(3)));
    assert!(!sequence.accept(Some(2)));
    assert!(sequence.accept(None));
    assert!(sequence.accept(Some(4)));
    assert_eq!(sequence.last(), Some(4));

    sequence.reset();
    assert!(sequence.accept(Some(1)));
}

#[test]
fn event_table_lists_listeners_per_gesture() {
    let container = Container::new()
        .with_behavior(ZoomContainer::new(ZoomProps::default()))
        .with_behavior(VoronoiContainer::new(VoronoiProps::default()))
        .with_behavior(CursorContainer::new(CursorProps::default()));
    assert_eq!(container.len(), 3);

    let table = container.event_table();
    let gestures: Vec<Gesture> = table.keys().copied().collect();
    assert_eq!(
        gestures,
        vec![
            Gesture::PointerDown,
            Gesture::PointerMove,
            Gesture::PointerUp,
            Gesture::PointerLeave,
            Gesture::Wheel,
        ]
    );
    assert_eq!(table[&Gesture::PointerMove], vec!["zoom", "voronoi", "cursor"]);
    assert_eq!(table[&Gesture::PointerLeave], vec!["zoom", "voronoi"]);
    assert_eq!(table[&Gesture::Wheel], vec!["zoom"]);
}

#[test]
fn dispatch_routes_only_to_registered_behaviors() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, full());
    let mut container = Container::new()
        .with_behavior(ZoomContainer::new(ZoomProps::default()))
        .with_behavior(CursorContainer::new(CursorProps::default()));

    let moved = container.dispatch(
        &ContainerEvent::PointerMove(PointerEvent::mouse(190.0, 130.0, 0.0)),
        &ctx,
    );
    assert_eq!(moved.len(), 1);
    assert!(matches!(moved[0].change, StateChange::Cursor(_)));

    let wheeled = container.dispatch(
        &ContainerEvent::Wheel(WheelEvent::new(225.0, 150.0, -150.0, 0.0)),
        &ctx,
    );
    assert_eq!(wheeled.len(), 1);
    assert!(matches!(wheeled[0].change, StateChange::Zoom(_)));
}

#[test]
fn children_get_generated_names() {
    let mut tree = ChartTree::new();
    let line = tree.add(Node::series(SeriesKind::Line, vec![Datum::new(1.0, 1.0)]));
    let named = tree.add(
        Node::series(SeriesKind::Scatter, vec![Datum::new(2.0, 2.0)]).named("dots"),
    );
    let roots = [line, named];
    let layout = ChartLayout::default();
    let scales = scales(&layout, full());
    let ctx = PlotContext::new(&tree, &roots, &layout, &scales, full());

    let children = Container::new()
        .with_behavior(CursorContainer::new(CursorProps::default()))
        .children(&ctx);
    let names: Vec<&str> = children.iter().map(|child| child.name.as_str()).collect();
    assert_eq!(names, vec!["line-0", "dots"]);
    assert!(children.iter().all(|child| child.domain.is_none() && child.data.is_none()));
}

#[test]
fn container_events_round_trip_through_json() {
    let event = ContainerEvent::Wheel(WheelEvent::new(1.0, 2.0, -3.0, 4.0));
    let json = serde_json::to_string(&event).expect("serialize event");
    assert!(json.contains("\"type\":\"wheel\""));
    let decoded: ContainerEvent = serde_json::from_str(&json).expect("deserialize event");
    assert_eq!(decoded, event);
    assert_eq!(decoded.gesture(), Gesture::Wheel);
}
