use chart_layout::core::props::PixelBox;
use chart_layout::core::voronoi::{find_nearest_site, get_datasets, merge_datasets, within_bounds};
use chart_layout::core::{
    Axis, ChartLayout, ChartTree, Datum, Domain, DomainBox, Node, NodeId, PlotContext, Point,
    ScaleKind, ScalePair, SeriesKind, VoronoiDiagram, VoronoiProps, compute_scale,
};

fn scales(layout: &ChartLayout, domain: DomainBox) -> ScalePair {
    let scale = |axis: Axis| {
        compute_scale(domain.get(axis), layout.data_range(axis), ScaleKind::Linear)
            .expect("linear scale")
            .into_shared()
    };
    ScalePair::new(scale(Axis::X), scale(Axis::Y))
}

fn series(points: &[(f64, f64)]) -> Vec<Datum> {
    points
        .iter()
        .enumerate()
        .map(|(index, (x, y))| Datum::new(*x, *y).with_event_key(index))
        .collect()
}

fn chart() -> (ChartTree, Vec<NodeId>) {
    let mut tree = ChartTree::new();
    let dots = tree.add(
        Node::series(SeriesKind::Scatter, series(&[(2.0, 2.0), (8.0, 8.0)])).named("dots"),
    );
    let trend = tree.add(
        Node::series(SeriesKind::Line, series(&[(2.0, 2.0), (5.0, 5.0)])).named("trend"),
    );
    (tree, vec![dots, trend])
}

fn domain() -> DomainBox {
    DomainBox::new(Domain::new(0.0, 10.0), Domain::new(0.0, 10.0))
}

#[test]
fn coincident_points_share_one_site() {
    let (tree, roots) = chart();
    let layout = ChartLayout::default();
    let scales = scales(&layout, domain());
    let ctx = PlotContext::new(&tree, &roots, &layout, &scales, domain());

    let site = find_nearest_site(&ctx, &VoronoiProps::default(), None, Point::new(121.0, 209.0))
        .expect("site near (2, 2)");
    assert!((site.x - 120.0).abs() <= 1e-9);
    assert!((site.y - 210.0).abs() <= 1e-9);
    assert_eq!(site.points.len(), 2);
    assert_eq!(site.points[0].child_name.as_deref(), Some("dots"));
    assert!(!site.points[0].continuous);
    assert_eq!(site.points[1].child_name.as_deref(), Some("trend"));
    assert!(site.points[1].continuous);
}

#[test]
fn sites_keep_first_seen_order() {
    let (tree, roots) = chart();
    let layout = ChartLayout::default();
    let scales = scales(&layout, domain());
    let ctx = PlotContext::new(&tree, &roots, &layout, &scales, domain());

    let points = get_datasets(&ctx, &VoronoiProps::default(), None);
    assert_eq!(points.len(), 4);
    let sites = merge_datasets(&ctx, points);
    let counts: Vec<usize> = sites.iter().map(|site| site.points.len()).collect();
    assert_eq!(counts, vec![2, 1, 1]);
}

#[test]
fn radius_limits_matches() {
    let (tree, roots) = chart();
    let layout = ChartLayout::default();
    let scales = scales(&layout, domain());
    let ctx = PlotContext::new(&tree, &roots, &layout, &scales, domain());
    let pointer = Point::new(130.0, 210.0);

    let tight = VoronoiProps::default().with_radius(5.0);
    assert!(find_nearest_site(&ctx, &tight, None, pointer).is_none());

    let loose = VoronoiProps::default().with_radius(20.0);
    assert!(find_nearest_site(&ctx, &loose, None, pointer).is_some());
}

#[test]
fn pointer_in_padding_finds_nothing() {
    let (tree, roots) = chart();
    let layout = ChartLayout::default();
    let scales = scales(&layout, domain());
    let ctx = PlotContext::new(&tree, &roots, &layout, &scales, domain());
    let props = VoronoiProps::default();

    assert!(!within_bounds(&ctx, &props, Point::new(10.0, 10.0)));
    assert!(find_nearest_site(&ctx, &props, None, Point::new(10.0, 10.0)).is_none());

    let unpadded = props.with_padding(chart_layout::core::Padding::uniform(0.0));
    assert!(within_bounds(&ctx, &unpadded, Point::new(10.0, 10.0)));
}

#[test]
fn blacklisted_series_are_ignored() {
    let (tree, roots) = chart();
    let layout = ChartLayout::default();
    let scales = scales(&layout, domain());
    let ctx = PlotContext::new(&tree, &roots, &layout, &scales, domain());

    let props = VoronoiProps::default().with_blacklist(["tre*"]);
    assert!(props.is_blacklisted("trend"));
    assert!(!props.is_blacklisted("dots"));

    let site = find_nearest_site(&ctx, &props, None, Point::new(120.0, 210.0)).expect("site");
    assert_eq!(site.points.len(), 1);
    assert_eq!(site.points[0].child_name.as_deref(), Some("dots"));
}

#[test]
fn one_dimensional_lookup_ignores_the_other_axis_and_radius() {
    let (tree, roots) = chart();
    let layout = ChartLayout::default();
    let scales = scales(&layout, domain());
    let ctx = PlotContext::new(&tree, &roots, &layout, &scales, domain());

    let props = VoronoiProps::default()
        .with_dimension(Axis::X)
        .with_radius(1.0);
    let site = find_nearest_site(&ctx, &props, None, Point::new(330.0, 60.0))
        .expect("site nearest in x");
    assert!((site.x - 330.0).abs() <= 1e-9);
    assert!((site.y - 250.0).abs() <= 1e-9);
    assert_eq!(site.points[0].datum.get(Axis::X), 8.0);
}

#[test]
fn explicit_data_has_no_child_name() {
    let tree = ChartTree::new();
    let layout = ChartLayout::default();
    let scales = scales(&layout, domain());
    let ctx = PlotContext::new(&tree, &[], &layout, &scales, domain());
    let data = series(&[(5.0, 5.0)]);

    let site = find_nearest_site(&ctx, &VoronoiProps::default(), Some(&data), Point::new(200.0, 200.0))
        .expect("site");
    assert_eq!(site.points.len(), 1);
    assert!(site.points[0].child_name.is_none());
    assert_eq!(site.points[0].event_key(), 0);
}

#[test]
fn ties_resolve_to_the_first_site() {
    let diagram = VoronoiDiagram::new(
        vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        PixelBox::new(-50.0, -50.0, 50.0, 50.0),
    );
    assert_eq!(diagram.find(Point::new(5.0, 0.0), None), Some(0));
    assert_eq!(diagram.find(Point::new(6.0, 0.0), None), Some(1));
    assert_eq!(VoronoiDiagram::new(Vec::new(), PixelBox::default()).find(Point::default(), None), None);
}

#[test]
fn cells_split_the_extent_along_the_bisector() {
    let diagram = VoronoiDiagram::new(
        vec![Point::new(25.0, 50.0), Point::new(75.0, 50.0)],
        PixelBox::new(0.0, 0.0, 100.0, 100.0),
    );
    let left = diagram.cell(0).expect("left cell");
    assert!(left.iter().all(|point| point.x <= 50.0 + 1e-9));
    assert!(left.iter().any(|point| (point.x - 50.0).abs() <= 1e-9));
    let right = diagram.cell(1).expect("right cell");
    assert!(right.iter().all(|point| point.x >= 50.0 - 1e-9));
    assert!(diagram.cell(2).is_none());
}
