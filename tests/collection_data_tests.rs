use chart_layout::core::collection::{
    are_sets_equal, contains_dates, max_value, min_value, split_array, uniq,
};
use chart_layout::core::data::{SortOrder, create_string_map};
use chart_layout::core::{Accessor, Axis, DataAccessors, ErrorValue, Value, format_data};
use chrono::{TimeZone, Utc};
use serde_json::json;

#[test]
fn extremes_of_mixed_values_become_dates() {
    let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date");
    let values = [Value::Number(5.0), Value::Date(date), Value::Number(-1.0)];
    assert!(contains_dates(&values));

    let min = min_value(&values).expect("min");
    assert!(min.is_date());
    assert_eq!(min.as_f64(), -1.0);
    let max = max_value(&values).expect("max");
    assert_eq!(max.as_f64(), date.timestamp_millis() as f64);

    assert!(min_value(&[]).is_none());
}

#[test]
fn set_equality_ignores_order() {
    assert!(are_sets_equal(&[1, 2, 3], &[3, 1, 2]));
    assert!(!are_sets_equal(&[1, 2], &[1, 2, 3]));
    assert!(!are_sets_equal(&[1, 2], &[1, 4]));
}

#[test]
fn split_drops_delimiters_and_empty_runs() {
    let items = ["a", "|", "b", "c", "|", "|", "d"];
    let runs = split_array(&items, |item| *item == "|");
    assert_eq!(runs, vec![&["a"][..], &["b", "c"][..], &["d"][..]]);
}

#[test]
fn uniq_keeps_first_seen_order() {
    assert_eq!(uniq(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    let map = create_string_map(["b", "a", "b"].map(str::to_owned));
    assert_eq!(map.get("b"), Some(&1));
    assert_eq!(map.get("a"), Some(&2));
}

#[test]
fn string_x_values_become_category_positions() {
    let records = vec![
        json!({ "x": "cats", "y": 3 }),
        json!({ "x": "dogs", "y": 5 }),
        json!({ "x": "cats", "y": 1 }),
    ];
    let categories = vec!["birds".to_owned()];
    let data = format_data(&records, &DataAccessors::default(), Some(&categories))
        .expect("formatted data");
    let xs: Vec<f64> = data.iter().map(|datum| datum.get(Axis::X)).collect();
    assert_eq!(xs, vec![2.0, 3.0, 2.0]);
    assert_eq!(data[0].x_name.as_deref(), Some("cats"));
    let keys: Vec<usize> = data.iter().map(|datum| datum.event_key).collect();
    assert_eq!(keys, vec![0, 1, 2]);
}

#[test]
fn missing_x_falls_back_to_record_position() {
    let records = vec![json!({ "y": 3 }), json!({ "y": 4 })];
    let data = format_data(&records, &DataAccessors::default(), None).expect("formatted data");
    let xs: Vec<f64> = data.iter().map(|datum| datum.get(Axis::X)).collect();
    assert_eq!(xs, vec![1.0, 2.0]);
}

#[test]
fn records_without_y_are_skipped() {
    let records = vec![json!({ "x": 1, "y": 3 }), json!({ "x": 2 }), json!({ "x": 3, "y": null })];
    let data = format_data(&records, &DataAccessors::default(), None).expect("formatted data");
    assert_eq!(data.len(), 1);
}

#[test]
fn nested_paths_and_indices_resolve() {
    let records = vec![json!({ "point": [4, 9], "stats": { "mean": 2.5 } })];
    let accessors = DataAccessors {
        x: Some(Accessor::key("point.0")),
        y: Accessor::key("stats.mean"),
        ..DataAccessors::default()
    };
    let data = format_data(&records, &accessors, None).expect("formatted data");
    assert_eq!((data[0].get(Axis::X), data[0].get(Axis::Y)), (4.0, 2.5));

    let tuples = vec![json!([1, 7])];
    let by_index = DataAccessors {
        x: Some(Accessor::Index(0)),
        y: Accessor::Index(1),
        ..DataAccessors::default()
    };
    let data = format_data(&tuples, &by_index, None).expect("formatted tuples");
    assert_eq!(data[0].get(Axis::Y), 7.0);
}

#[test]
fn empty_path_segments_are_rejected() {
    let accessors = DataAccessors {
        y: Accessor::key("stats..mean"),
        ..DataAccessors::default()
    };
    assert!(format_data(&[], &accessors, None).is_err());
}

#[test]
fn negative_errors_are_coerced_to_zero() {
    let records = vec![json!({ "x": 1, "y": 3, "ey": -2, "ex": [1, -4] })];
    let accessors = DataAccessors::default()
        .with_errors(Some(Accessor::key("ex")), Some(Accessor::key("ey")));
    let data = format_data(&records, &accessors, None).expect("formatted data");
    assert_eq!(data[0].error_y, Some(ErrorValue::Symmetric(0.0)));
    assert_eq!(data[0].error_x, Some(ErrorValue::Pair([1.0, 0.0])));
}

#[test]
fn candlestick_records_carry_ohlc() {
    let records = vec![json!({ "x": 1, "open": 4, "high": 9, "low": 2, "close": 6 })];
    let data = format_data(&records, &DataAccessors::candlestick(), None).expect("candles");
    let ohlc = data[0].ohlc.expect("ohlc");
    assert_eq!((ohlc.low, ohlc.high), (2.0, 9.0));
    assert_eq!(data[0].get(Axis::Y), 6.0);
}

#[test]
fn time_strings_parse_as_dates() {
    let records = vec![
        json!({ "x": "2024-03-01T00:00:00Z", "y": 1 }),
        json!({ "x": "2024-01-01T00:00:00Z", "y": 2 }),
    ];
    let accessors = DataAccessors {
        x_is_time: true,
        ..DataAccessors::default()
    }
    .with_sort(Axis::X, SortOrder::Ascending);
    let data = format_data(&records, &accessors, None).expect("dates");
    assert!(data.iter().all(|datum| datum.x.is_date()));
    assert_eq!(data[0].get(Axis::Y), 2.0);
    assert_eq!(data[0].event_key, 0);
}
