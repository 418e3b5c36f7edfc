use chart_layout::core::tree::{
    get_chart_domain, get_data_from_children, get_default_domain_padding,
    get_domain_from_children, get_strings_from_children, reduce_children,
};
use chart_layout::core::{
    Axis, ChartLayout, ChartTree, Datum, Domain, DomainProps, ErrorValue, Node, Ohlc, SeriesKind,
};

fn series(points: &[(f64, f64)]) -> Vec<Datum> {
    points.iter().map(|(x, y)| Datum::new(*x, *y)).collect()
}

fn props() -> DomainProps {
    DomainProps::new(ChartLayout::default())
}

fn stacked_bars() -> (ChartTree, Vec<chart_layout::core::NodeId>) {
    let mut tree = ChartTree::new();
    let stack = tree.add(Node::stack());
    tree.append_child(
        stack,
        Node::series(SeriesKind::Bar, series(&[(1.0, 2.0), (2.0, 3.0)])).named("low"),
    )
    .expect("append low");
    tree.append_child(
        stack,
        Node::series(SeriesKind::Bar, series(&[(1.0, 4.0), (2.0, 1.0)])).named("high"),
    )
    .expect("append high");
    (tree, vec![stack])
}

#[test]
fn appending_to_an_unknown_parent_fails() {
    let mut other = ChartTree::new();
    other.add(Node::container());
    let foreign = other.add(Node::container());

    let mut tree = ChartTree::new();
    assert!(tree.append_child(foreign, Node::container()).is_err());
    assert!(tree.is_empty());
}

#[test]
fn leaves_are_visited_in_document_order_with_generated_names() {
    let mut tree = ChartTree::new();
    let root = tree.add(Node::container());
    let group = tree
        .append_child(root, Node::group(0.0))
        .expect("append group");
    tree.append_child(group, Node::series(SeriesKind::Line, series(&[(1.0, 1.0)])))
        .expect("append line");
    tree.append_child(
        group,
        Node::series(SeriesKind::Scatter, series(&[(2.0, 2.0)])).named("dots"),
    )
    .expect("append scatter");
    tree.append_child(root, Node::axis(false, Vec::new()))
        .expect("append axis");

    let names = reduce_children(&tree, &[root], &props(), |visit| Some(visit.name.clone()));
    assert_eq!(names, vec!["line-0-0-0", "dots", "axis-0-1"]);

    let parents = reduce_children(&tree, &[root], &props(), |visit| visit.parent);
    assert_eq!(parents, vec![group, group, root]);
}

#[test]
fn stack_children_receive_stacked_data() {
    let (tree, roots) = stacked_bars();
    let tops = reduce_children(&tree, &roots, &props(), |visit| {
        Some((visit.stack_index, visit.data.iter().map(|d| d.y1).collect::<Vec<_>>()))
    });
    assert_eq!(
        tops,
        vec![
            (Some(0), vec![Some(2.0), Some(3.0)]),
            (Some(1), vec![Some(6.0), Some(4.0)]),
        ]
    );
}

#[test]
fn stacked_children_domain_covers_the_totals() {
    let (tree, roots) = stacked_bars();
    let y = get_domain_from_children(&tree, &roots, &props(), Axis::Y);
    assert_eq!((y.start, y.end), (0.0, 6.0));
    let x = get_domain_from_children(&tree, &roots, &props(), Axis::X);
    assert_eq!((x.start, x.end), (1.0, 2.0));
}

#[test]
fn stacked_data_is_regrouped_by_position() {
    let (tree, roots) = stacked_bars();
    let grouped = get_data_from_children(&tree, &roots, &props());
    assert_eq!(grouped.len(), 2);
    let first: Vec<f64> = grouped[0].iter().map(|datum| datum.get(Axis::Y)).collect();
    assert_eq!(first, vec![2.0, 4.0]);
}

#[test]
fn empty_tree_falls_back_to_unit_domain() {
    let tree = ChartTree::new();
    let domain = get_domain_from_children(&tree, &[], &props(), Axis::X);
    assert_eq!(domain, Domain::unit());
    let chart = get_chart_domain(&tree, &[], &props(), &[], Axis::Y);
    assert_eq!(chart, Domain::unit());
}

#[test]
fn chart_domain_unions_own_data_and_children() {
    let mut tree = ChartTree::new();
    let line = tree.add(Node::series(SeriesKind::Line, series(&[(0.0, -2.0), (5.0, 3.0)])));
    let own = series(&[(6.0, 9.0), (8.0, 10.0)]);

    let x = get_chart_domain(&tree, &[line], &props(), &own, Axis::X);
    let y = get_chart_domain(&tree, &[line], &props(), &own, Axis::Y);
    assert_eq!((x.start, x.end), (0.0, 8.0));
    assert_eq!((y.start, y.end), (-2.0, 10.0));
}

#[test]
fn parent_bounds_override_child_data() {
    let mut tree = ChartTree::new();
    let line = tree.add(Node::series(SeriesKind::Line, series(&[(0.0, 1.0), (5.0, 3.0)])));
    let props = props().with_max_domain(Axis::Y, 20.0);
    let y = get_chart_domain(&tree, &[line], &props, &[], Axis::Y);
    assert_eq!((y.start, y.end), (1.0, 20.0));
}

#[test]
fn grouped_offsets_pad_the_x_domain() {
    let mut tree = ChartTree::new();
    let group = tree.add(Node::group(10.0));
    for _ in 0..3 {
        tree.append_child(
            group,
            Node::series(SeriesKind::Bar, series(&[(1.0, 1.0), (3.0, 2.0)])),
        )
        .expect("append bar");
    }
    assert_eq!(get_default_domain_padding(&tree, &[group], &props()), Some(15.0));

    let x = get_chart_domain(&tree, &[group], &props(), &[], Axis::X);
    assert!(x.min() > 0.0 && x.min() < 1.0);
    assert!(x.max() > 3.0);

    let polar = DomainProps::new(ChartLayout::default().with_polar(0.0, 360.0));
    assert_eq!(get_default_domain_padding(&tree, &[group], &polar), None);
}

#[test]
fn strings_come_from_categories_names_and_tick_labels() {
    let mut tree = ChartTree::new();
    let root = tree.add(Node::container());
    tree.append_child(
        root,
        Node::series(
            SeriesKind::Bar,
            vec![
                Datum::new(1.0, 1.0).with_x_name("apples"),
                Datum::new(2.0, 1.0).with_x_name("pears"),
            ],
        ),
    )
    .expect("append bar");
    tree.append_child(root, Node::axis(false, vec!["plums".to_owned(), "apples".to_owned()]))
        .expect("append axis");
    tree.append_child(root, Node::axis(true, vec!["low".to_owned()]))
        .expect("append dependent axis");

    let props = props().with_categories(Axis::X, vec!["figs".to_owned()]);
    assert_eq!(
        get_strings_from_children(&tree, &[root], &props, Axis::X),
        vec!["figs", "apples", "pears", "plums"]
    );
    assert_eq!(
        get_strings_from_children(&tree, &[root], &props, Axis::Y),
        vec!["low"]
    );
}

#[test]
fn candlesticks_span_low_to_high() {
    let data = vec![
        Datum::new(1.0, 5.0).with_ohlc(Ohlc::new(4.0, 10.0, 1.0, 5.0)),
        Datum::new(2.0, 6.0).with_ohlc(Ohlc::new(5.0, 8.0, 3.0, 6.0)),
    ];
    let y = SeriesKind::Candlestick
        .get_domain(&props(), Axis::Y, &data)
        .expect("candle domain");
    assert_eq!((y.start, y.end), (1.0, 10.0));
}

#[test]
fn error_bars_extend_the_domain() {
    let data = vec![
        Datum::new(1.0, 5.0).with_errors(None, Some(ErrorValue::Symmetric(2.0))),
        Datum::new(2.0, 6.0),
    ];
    let y = SeriesKind::ErrorBar
        .get_domain(&props(), Axis::Y, &data)
        .expect("error domain");
    assert_eq!((y.start, y.end), (3.0, 7.0));
}

#[test]
fn nested_stack_domain_sums_each_sign_separately() {
    let mut tree = ChartTree::new();
    let root = tree.add(Node::container());
    let stack = tree.append_child(root, Node::stack()).expect("append stack");
    tree.append_child(
        stack,
        Node::series(SeriesKind::Line, series(&[(1.0, 2.0), (2.0, -3.0)])),
    )
    .expect("append first");
    tree.append_child(
        stack,
        Node::series(SeriesKind::Line, series(&[(1.0, 4.0), (2.0, -1.0)])),
    )
    .expect("append second");

    let y = get_domain_from_children(&tree, &[root], &props(), Axis::Y);
    assert_eq!((y.start, y.end), (-4.0, 6.0));
    let x = get_domain_from_children(&tree, &[root], &props(), Axis::X);
    assert_eq!((x.start, x.end), (1.0, 2.0));
}
