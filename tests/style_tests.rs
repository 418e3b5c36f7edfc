use chart_layout::core::{Axis, Datum, StyleScalar, StyleSpec, evaluate_style};

#[test]
fn static_values_resolve_in_insertion_order() {
    let spec = StyleSpec::new().with("fill", "tomato").with("opacity", 0.5);
    let resolved = evaluate_style(&spec, &Datum::new(1.0, 2.0), false);
    let names: Vec<&str> = resolved.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["fill", "opacity"]);
    assert_eq!(resolved.get("fill").and_then(StyleScalar::as_text), Some("tomato"));
    assert_eq!(resolved.number("opacity"), Some(0.5));
}

#[test]
fn computed_values_see_datum_and_active_flag() {
    let spec = StyleSpec::new()
        .with_computed("size", |datum: &Datum, active: bool| {
            let base = datum.get(Axis::Y);
            StyleScalar::Number(if active { base * 2.0 } else { base })
        })
        .with_computed("stroke", |_: &Datum, active: bool| {
            StyleScalar::Text(if active { "black" } else { "none" }.to_owned())
        });
    let datum = Datum::new(0.0, 3.0);

    let idle = evaluate_style(&spec, &datum, false);
    assert_eq!(idle.number("size"), Some(3.0));
    assert_eq!(idle.get("stroke").and_then(StyleScalar::as_text), Some("none"));

    let active = evaluate_style(&spec, &datum, true);
    assert_eq!(active.number("size"), Some(6.0));
    assert_eq!(active.get("stroke").and_then(StyleScalar::as_text), Some("black"));
}

#[test]
fn pixel_strings_read_as_numbers() {
    assert_eq!(StyleScalar::Text("12px".to_owned()).as_number(), Some(12.0));
    assert_eq!(StyleScalar::Text("bold".to_owned()).as_number(), None);
    assert_eq!(StyleScalar::Number(4.0).as_text(), None);
}
