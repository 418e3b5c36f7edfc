use chart_layout::core::stack::fill_data;
use chart_layout::core::{Axis, Datum, StackOptions, compute_stacked_layout};

fn series(points: &[(f64, f64)]) -> Vec<Datum> {
    points
        .iter()
        .enumerate()
        .map(|(index, (x, y))| Datum::new(*x, *y).with_event_key(index))
        .collect()
}

fn column(datasets: &[Vec<Datum>], x: f64) -> Vec<(f64, f64)> {
    datasets
        .iter()
        .filter_map(|dataset| dataset.iter().find(|datum| datum.get(Axis::X) == x))
        .map(|datum| (datum.y0.expect("y0"), datum.y1.expect("y1")))
        .collect()
}

#[test]
fn positive_values_accumulate_bottom_to_top() {
    let stacked = compute_stacked_layout(
        &[
            series(&[(1.0, 1.0), (2.0, 2.0)]),
            series(&[(1.0, 3.0), (2.0, 1.0)]),
            series(&[(1.0, 2.0), (2.0, 2.0)]),
        ],
        StackOptions::default(),
    );
    assert_eq!(column(&stacked, 1.0), vec![(0.0, 1.0), (1.0, 4.0), (4.0, 6.0)]);
    assert_eq!(column(&stacked, 2.0), vec![(0.0, 2.0), (2.0, 3.0), (3.0, 5.0)]);
}

#[test]
fn negative_values_stack_separately_from_positive_ones() {
    let stacked = compute_stacked_layout(
        &[
            series(&[(1.0, 2.0)]),
            series(&[(1.0, -3.0)]),
            series(&[(1.0, 4.0)]),
            series(&[(1.0, -1.0)]),
        ],
        StackOptions::default(),
    );
    assert_eq!(
        column(&stacked, 1.0),
        vec![(0.0, 2.0), (0.0, -3.0), (2.0, 6.0), (-3.0, -4.0)]
    );
}

#[test]
fn missing_categories_are_filled_with_zero() {
    let stacked = compute_stacked_layout(
        &[series(&[(1.0, 1.0), (2.0, 2.0)]), series(&[(1.0, 3.0), (3.0, 1.0)])],
        StackOptions::default(),
    );
    assert_eq!(stacked[0].len(), 3);
    assert_eq!(stacked[1].len(), 3);

    let gap = stacked[1]
        .iter()
        .find(|datum| datum.get(Axis::X) == 2.0)
        .expect("filled gap");
    assert_eq!(gap.get(Axis::Y), 0.0);
    assert_eq!(gap.y0, Some(2.0));
    assert_eq!(gap.event_key, 2);

    let xs: Vec<f64> = stacked[0].iter().map(|datum| datum.get(Axis::X)).collect();
    assert_eq!(xs, vec![1.0, 2.0, 3.0]);
}

#[test]
fn filling_can_be_disabled() {
    let datasets = [series(&[(1.0, 1.0)]), series(&[(2.0, 1.0), (3.0, 1.0)])];
    let stacked = compute_stacked_layout(
        &datasets,
        StackOptions::default().with_fill_in_missing_data(false),
    );
    assert_eq!(stacked[0].len(), 1);
    assert_eq!(stacked[1].len(), 2);
    assert_eq!(fill_data(&datasets, false), datasets.to_vec());
}

#[test]
fn x_offset_sets_x1() {
    let stacked = compute_stacked_layout(
        &[series(&[(1.0, 1.0), (2.0, 1.0)])],
        StackOptions::default().with_x_offset(0.25),
    );
    let x1: Vec<Option<f64>> = stacked[0].iter().map(|datum| datum.x1).collect();
    assert_eq!(x1, vec![Some(1.25), Some(2.25)]);
}

#[test]
fn first_series_baseline_lifts_the_stack() {
    let first = vec![Datum::new(1.0, 2.0).with_y0(1.0)];
    let second = series(&[(1.0, 3.0)]);
    let stacked = compute_stacked_layout(&[first, second], StackOptions::default());
    assert_eq!(column(&stacked, 1.0), vec![(1.0, 3.0), (3.0, 6.0)]);
}
