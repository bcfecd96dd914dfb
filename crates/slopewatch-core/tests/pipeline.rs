use chrono::NaiveDate;
use slopewatch_core::{export, CanonicalTable, TableCache};
use slopewatch_parser::{parse_survey_file, DetectionConfig};

fn table(content: &str) -> CanonicalTable {
    let parsed =
        parse_survey_file(content, &DetectionConfig::default()).expect("parse failed");
    CanonicalTable::from_survey(parsed).expect("normalization failed")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("invalid test date")
}

#[test]
fn sorts_ascending_and_deduplicates_dates() {
    let t = table(
        "fecha,1,rainfall(mm)\n\
         05/01/2023,2.0,10\n\
         01/01/2023,1.0,5\n\
         05/01/2023,9.9,99\n\
         03/01/2023,1.5,7\n",
    );

    assert_eq!(
        t.dates(),
        &[date(2023, 1, 1), date(2023, 1, 3), date(2023, 1, 5)]
    );
    for pair in t.dates().windows(2) {
        assert!(pair[0] <= pair[1]);
    }

    // The duplicate 05/01 row keeps its first occurrence.
    assert_eq!(t.series()[0].values, vec![Some(1.0), Some(1.5), Some(2.0)]);
    assert_eq!(t.precipitation(), &[Some(5.0), Some(7.0), Some(10.0)]);
}

#[test]
fn cumulative_displacement_is_a_running_sum() {
    let t = table(
        "fecha,1,rainfall(mm)\n\
         01/01/2023,1.0,5\n\
         02/01/2023,1.5,6\n\
         03/01/2023,2.0,7\n",
    );

    let values = &t.series()[0].values;
    let cumulative = t.cumulative_displacement();
    assert_eq!(cumulative[0], values[0]);
    for idx in 1..t.height() {
        let expected = cumulative[idx - 1].unwrap() + values[idx].unwrap();
        assert_eq!(cumulative[idx], Some(expected));
    }
    assert_eq!(cumulative, &[Some(1.0), Some(2.5), Some(4.5)]);
}

#[test]
fn cumulative_displacement_carries_missing_cells_forward() {
    let t = table(
        "fecha,1,rainfall(mm)\n\
         01/01/2023,1.0,5\n\
         02/01/2023,,6\n\
         03/01/2023,2.0,7\n",
    );

    assert_eq!(
        t.cumulative_displacement(),
        &[Some(1.0), Some(1.0), Some(3.0)]
    );
}

#[test]
fn rate_of_change_averages_series_per_elapsed_day() {
    let t = table(
        "fecha,1,2,rainfall(mm)\n\
         01/01/2023,1.0,0.0,5\n\
         03/01/2023,2.0,3.0,6\n",
    );

    // Two elapsed days; series deltas 1.0 and 3.0 give daily rates 0.5 and
    // 1.5, mean 1.0. Undefined at row 0.
    assert_eq!(t.rate_of_change(), &[None, Some(1.0)]);
}

#[test]
fn rate_of_change_skips_series_with_missing_endpoints() {
    let t = table(
        "fecha,1,2,rainfall(mm)\n\
         01/01/2023,1.0,0.0,5\n\
         02/01/2023,2.0,,6\n",
    );

    // Series 2 has no value on the second row, so only series 1 contributes.
    assert_eq!(t.rate_of_change(), &[None, Some(1.0)]);
}

#[test]
fn fastest_movement_breaks_ties_by_first_occurrence() {
    let t = table(
        "fecha,1,rainfall(mm)\n\
         01/01/2023,0.0,5\n\
         02/01/2023,1.0,6\n\
         03/01/2023,2.0,7\n",
    );

    // Both transitions have rate 1.0/day; the earlier date wins.
    assert_eq!(t.fastest_movement(), Some((date(2023, 1, 2), 1.0)));
}

#[test]
fn loading_identical_bytes_is_idempotent() {
    let content = "fecha,1,rainfall(mm)\n02/01/2023,2.0,7\n01/01/2023,1.0,5\n";
    assert_eq!(table(content), table(content));
}

#[test]
fn filter_range_is_non_destructive() {
    let t = table(
        "fecha,1,rainfall(mm)\n\
         01/01/2023,1.0,5\n\
         02/01/2023,1.5,6\n\
         03/01/2023,2.0,7\n",
    );

    let window = t.filter_range(Some(date(2023, 1, 2)), Some(date(2023, 1, 2)));
    assert_eq!(window.dates(), &[date(2023, 1, 2)]);
    // Derived columns are recomputed over the view, so the view is itself a
    // valid canonical table.
    assert_eq!(window.cumulative_displacement(), &[Some(1.5)]);
    assert_eq!(window.rate_of_change(), &[None]);

    // Removing the filter reproduces the original table exactly.
    assert_eq!(t.filter_range(None, None), t);
    assert_eq!(t.height(), 3);
}

#[test]
fn filter_range_bounds_are_inclusive() {
    let t = table(
        "fecha,1,rainfall(mm)\n\
         01/01/2023,1.0,5\n\
         02/01/2023,1.5,6\n\
         03/01/2023,2.0,7\n",
    );

    let window = t.filter_range(Some(date(2023, 1, 1)), Some(date(2023, 1, 3)));
    assert_eq!(window, t);
}

#[test]
fn dataframe_exposes_the_chart_builder_schema() {
    let t = table(
        "fecha,10,2,rainfall(mm)\n\
         01/01/2023,1.0,0.5,5\n\
         02/01/2023,1.5,0.6,6\n",
    );

    let df = t.to_dataframe().expect("dataframe build failed");
    assert_eq!(df.height(), 2);
    assert_eq!(
        df.get_column_names_str(),
        vec![
            "timestamp",
            "2",
            "10",
            "precipitation",
            "cumulative_displacement",
            "rate_of_change"
        ]
    );
}

#[test]
fn cache_reuses_tables_for_identical_bytes() {
    let config = DetectionConfig::default();
    let bytes = b"fecha,1,rainfall(mm)\n01/01/2023,1.0,5\n";
    let other = b"fecha,1,rainfall(mm)\n01/01/2023,2.0,9\n";

    let mut cache = TableCache::new();
    let first = cache.load(bytes, &config).expect("first load failed");
    let second = cache.load(bytes, &config).expect("second load failed");
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    let third = cache.load(other, &config).expect("third load failed");
    assert!(!std::sync::Arc::ptr_eq(&first, &third));
    assert_eq!(cache.len(), 2);
}

#[test]
fn cache_does_not_retain_failures() {
    let mut cache = TableCache::new();
    let err = cache.load(b"nonsense", &DetectionConfig::default());
    assert!(err.is_err());
    assert!(cache.is_empty());
}

#[test]
fn export_preserves_column_order_and_formatting() {
    let t = table("fecha,1,rainfall(mm)\n02/01/2023,2.5,7\n01/01/2023,1.25,5.5\n");

    let rendered = export::to_csv_string(&t, b',').expect("export failed");
    assert_eq!(
        rendered,
        "timestamp,1,precipitation,cumulative_displacement,rate_of_change\n\
         2023-01-01,1.25,5.5,1.25,\n\
         2023-01-02,2.5,7,3.75,1.25\n"
    );
}

#[test]
fn export_supports_semicolon_delimiters() {
    let t = table("fecha,1,rainfall(mm)\n01/01/2023,1.0,5\n");

    let rendered = export::to_csv_string(&t, b';').expect("export failed");
    assert!(rendered
        .starts_with("timestamp;1;precipitation;cumulative_displacement;rate_of_change\n"));
}
