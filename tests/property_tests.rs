use approx::relative_eq;
use chart_layout::core::domain::get_domain_from_min_max;
use chart_layout::core::{
    Axis, ChartLayout, Datum, Domain, DomainProps, PixelBox, Point, Scale, ScaleKind, StackOptions,
    VoronoiDiagram, compute_scale, compute_stacked_layout, get_domain,
};
use chart_layout::interaction::brush_line::pan_range;
use chart_layout::interaction::zoom_container::{downsample, downsample_zoom_data};
use proptest::prelude::*;

fn points(values: &[(f64, f64)]) -> Vec<Datum> {
    values
        .iter()
        .enumerate()
        .map(|(index, (x, y))| Datum::new(*x, *y).with_event_key(index))
        .collect()
}

proptest! {
    #[test]
    fn single_value_domains_are_never_degenerate(value in -1_000.0f64..1_000.0) {
        let domain = get_domain_from_min_max(value, value, false);
        prop_assert!(domain.start < domain.end);
        prop_assert!(domain.contains(value));
    }

    #[test]
    fn padding_never_crosses_zero_for_positive_data(
        start in 0.0f64..1_000.0,
        span in 0.001f64..1_000.0,
        padding in 0.0f64..150.0
    ) {
        let props = DomainProps::new(ChartLayout::default()).with_domain_padding(padding);
        let data = points(&[(start, 1.0), (start + span, 2.0)]);
        let domain = get_domain(&props, Axis::X, &data).expect("domain");
        prop_assert!(domain.min() >= 0.0);
        prop_assert!(domain.min() <= start);
        prop_assert!(domain.max() >= start + span);
    }

    #[test]
    fn log_domains_never_touch_zero(
        max in 0.001f64..1_000.0,
        negative in any::<bool>()
    ) {
        let bound = if negative { -max } else { max };
        let props = DomainProps::new(ChartLayout::default()).with_scale(Axis::Y, ScaleKind::Log);
        let data = points(&[(1.0, 0.0), (2.0, bound)]);
        let domain = get_domain(&props, Axis::Y, &data).expect("domain");
        prop_assert!(domain.start != 0.0 && domain.end != 0.0);
        prop_assert_eq!(domain.start.signum(), domain.end.signum());
    }

    #[test]
    fn stacked_values_keep_their_sign_side(
        columns in prop::collection::vec(
            prop::collection::vec(
                prop_oneof![-100.0f64..-0.001, 0.001f64..100.0],
                1..4
            ),
            1..6
        )
    ) {
        let width = columns.iter().map(Vec::len).min().unwrap_or(0);
        let datasets: Vec<Vec<Datum>> = columns
            .iter()
            .map(|ys| {
                let values: Vec<(f64, f64)> =
                    ys.iter().take(width).enumerate().map(|(x, y)| (x as f64, *y)).collect();
                points(&values)
            })
            .collect();

        let stacked = compute_stacked_layout(&datasets, StackOptions::default());
        for dataset in &stacked {
            for datum in dataset {
                let y = datum.get(Axis::Y);
                let y0 = datum.y0.expect("y0");
                let y1 = datum.y1.expect("y1");
                prop_assert!(relative_eq!(y1, y0 + y, epsilon = 1e-9));
                if y > 0.0 {
                    prop_assert!(y0 >= 0.0);
                } else {
                    prop_assert!(y0 <= 0.0);
                }
            }
        }
    }

    #[test]
    fn linear_scale_round_trip(
        start in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        factor in 0.0f64..1.0
    ) {
        let domain = Domain::new(start, start + span);
        let value = start + factor * span;
        let scale = compute_scale(domain, (50.0, 400.0), ScaleKind::Linear).expect("scale");
        let recovered = scale.invert(scale.apply(value));
        prop_assert!(relative_eq!(recovered, value, epsilon = 1e-6, max_relative = 1e-9));
    }

    #[test]
    fn nearest_site_is_no_farther_than_any_other(
        sites in prop::collection::vec((0.0f64..400.0, 0.0f64..300.0), 1..40),
        pointer in (0.0f64..400.0, 0.0f64..300.0)
    ) {
        let sites: Vec<Point> = sites.into_iter().map(|(x, y)| Point::new(x, y)).collect();
        let pointer = Point::new(pointer.0, pointer.1);
        let diagram = VoronoiDiagram::new(sites.clone(), PixelBox::new(0.0, 0.0, 400.0, 300.0));
        let found = diagram.find(pointer, None).expect("nearest site");
        let distance = |site: &Point| (site.x - pointer.x).hypot(site.y - pointer.y);
        let best = distance(&sites[found]);
        prop_assert!(sites.iter().all(|site| best <= distance(site) + 1e-9));
    }

    #[test]
    fn panned_brush_stays_inside_and_keeps_its_width(
        low in 0.0f64..300.0,
        width in 1.0f64..100.0,
        delta in -1_000.0f64..1_000.0
    ) {
        let full = (0.0, 400.0);
        let ((start, end), _) = pan_range((low, low + width), full, delta);
        prop_assert!(start >= full.0 && end <= full.1);
        prop_assert!(relative_eq!(end - start, width, epsilon = 1e-9));
    }

    #[test]
    fn downsampling_respects_the_point_budget(
        len in 0usize..5_000,
        max_points in 1usize..200,
        window in (0.0f64..5_000.0, 0.0f64..5_000.0)
    ) {
        let data: Vec<Datum> = (0..len)
            .map(|index| Datum::new(index as f64, 1.0).with_event_key(index))
            .collect();
        prop_assert!(downsample(&data, max_points, 0).len() <= max_points);

        let domain = Domain::new(window.0.min(window.1), window.0.max(window.1));
        let sampled = downsample_zoom_data(&data, domain, Axis::X, max_points);
        prop_assert!(sampled.len() <= max_points);
        prop_assert!(sampled.windows(2).all(|pair| pair[0].event_key < pair[1].event_key));
    }
}
