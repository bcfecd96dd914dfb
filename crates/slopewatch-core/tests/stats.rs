use chrono::NaiveDate;
use slopewatch_core::{compute_stats, CanonicalTable, PipelineError, SeriesSummary};
use slopewatch_parser::{parse_survey_file, DetectionConfig};

fn table(content: &str) -> CanonicalTable {
    let parsed =
        parse_survey_file(content, &DetectionConfig::default()).expect("parse failed");
    CanonicalTable::from_survey(parsed).expect("normalization failed")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("invalid test date")
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("expected a value");
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn summary_matches_describe_semantics() {
    let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
    let summary = SeriesSummary::from_values("x", &values);

    assert_eq!(summary.count, 4);
    assert_close(summary.mean, 2.5);
    // Sample standard deviation (ddof = 1).
    assert_close(summary.std, 1.2909944487358056);
    assert_close(summary.min, 1.0);
    // Linearly interpolated quartiles.
    assert_close(summary.q1, 1.75);
    assert_close(summary.median, 2.5);
    assert_close(summary.q3, 3.25);
    assert_close(summary.max, 4.0);
}

#[test]
fn summary_ignores_missing_cells() {
    let values = [Some(1.0), None, Some(3.0)];
    let summary = SeriesSummary::from_values("x", &values);

    assert_eq!(summary.count, 2);
    assert_close(summary.mean, 2.0);
    assert_close(summary.std, std::f64::consts::SQRT_2);
}

#[test]
fn summary_of_empty_column_has_no_values() {
    let summary = SeriesSummary::from_values("x", &[None, None]);

    assert_eq!(summary.count, 0);
    assert_eq!(summary.mean, None);
    assert_eq!(summary.std, None);
    assert_eq!(summary.min, None);
    assert_eq!(summary.max, None);
}

#[test]
fn single_value_has_no_std() {
    let summary = SeriesSummary::from_values("x", &[Some(2.0)]);

    assert_eq!(summary.count, 1);
    assert_close(summary.mean, 2.0);
    assert_eq!(summary.std, None);
    assert_close(summary.median, 2.0);
}

#[test]
fn stats_report_totals_correlation_and_extremes() {
    let t = table(
        "fecha,1,rainfall(mm)\n\
         01/01/2023,1.0,10\n\
         02/01/2023,2.0,20\n\
         03/01/2023,3.0,30\n",
    );

    let stats = compute_stats(&t, None).expect("stats failed");

    assert_eq!(stats.correlation_series, "1");
    assert_close(stats.correlation, 1.0);
    assert!((stats.total_precipitation - 60.0).abs() < 1e-12);
    assert_close(stats.mean_precipitation, 20.0);

    let max_displacement = stats.max_displacement.expect("missing max displacement");
    assert_eq!(max_displacement.date, date(2023, 1, 3));
    assert_eq!(max_displacement.column, "1");
    assert_eq!(max_displacement.value, 3.0);

    let max_precipitation = stats.max_precipitation.expect("missing max precipitation");
    assert_eq!(max_precipitation.date, date(2023, 1, 3));
    assert_eq!(max_precipitation.value, 30.0);

    // Both daily rates are 1.0; the tie resolves to the earlier date.
    let fastest = stats.fastest_movement.expect("missing fastest movement");
    assert_eq!(fastest.date, date(2023, 1, 2));
    assert_eq!(fastest.value, 1.0);
}

#[test]
fn correlation_is_undefined_at_zero_variance() {
    let t = table(
        "fecha,1,rainfall(mm)\n\
         01/01/2023,1.0,10\n\
         02/01/2023,2.0,10\n\
         03/01/2023,3.0,10\n",
    );

    let stats = compute_stats(&t, None).expect("stats failed");
    assert_eq!(stats.correlation, None);
}

#[test]
fn correlation_uses_the_chosen_series() {
    let t = table(
        "fecha,1,2,rainfall(mm)\n\
         01/01/2023,1.0,3.0,10\n\
         02/01/2023,2.0,2.0,20\n\
         03/01/2023,3.0,1.0,30\n",
    );

    let stats = compute_stats(&t, Some("2")).expect("stats failed");
    assert_eq!(stats.correlation_series, "2");
    assert_close(stats.correlation, -1.0);
}

#[test]
fn unknown_series_is_a_validation_error() {
    let t = table("fecha,1,rainfall(mm)\n01/01/2023,1.0,10\n");

    match compute_stats(&t, Some("nope")) {
        Err(PipelineError::Validation(message)) => {
            assert!(message.contains("nope"), "unexpected message: {message}");
        }
        other => panic!("expected Validation error, got {other:?}"),
    }
}

#[test]
fn per_series_summaries_cover_every_series() {
    let t = table(
        "fecha,10,2,rainfall(mm)\n\
         01/01/2023,1.0,0.5,10\n\
         02/01/2023,2.0,0.7,20\n",
    );

    let stats = compute_stats(&t, None).expect("stats failed");
    let names: Vec<&str> = stats
        .series
        .iter()
        .map(|summary| summary.name.as_str())
        .collect();
    assert_eq!(names, vec!["2", "10"]);
    assert_eq!(stats.precipitation.count, 2);
}
