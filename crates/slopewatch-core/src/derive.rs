use chrono::NaiveDate;
use slopewatch_parser::DisplacementSeries;

/// Running sum over one displacement series. A missing cell carries the
/// previous cumulative value forward; the column stays missing until the
/// first present value, so `cumulative[0] == displacement[0]`.
pub fn cumulative_displacement(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut running: Option<f64> = None;
    for value in values {
        running = match (running, value) {
            (Some(acc), Some(v)) => Some(acc + v),
            (Some(acc), None) => Some(acc),
            (None, Some(v)) => Some(*v),
            (None, None) => None,
        };
        out.push(running);
    }
    out
}

/// Mean daily rate of change across all displacement series: per series,
/// the difference to the previous row divided by the elapsed days, averaged
/// over the series where both endpoints are present. Undefined at row 0 and
/// wherever no series qualifies.
pub fn rate_of_change(dates: &[NaiveDate], series: &[DisplacementSeries]) -> Vec<Option<f64>> {
    let mut out = vec![None; dates.len()];
    for idx in 1..dates.len() {
        let delta_days = (dates[idx] - dates[idx - 1]).num_days() as f64;
        if delta_days <= 0.0 {
            continue;
        }

        let mut sum = 0.0;
        let mut count = 0usize;
        for entry in series {
            if let (Some(prev), Some(curr)) = (entry.values[idx - 1], entry.values[idx]) {
                sum += (curr - prev) / delta_days;
                count += 1;
            }
        }

        if count > 0 {
            out[idx] = Some(sum / count as f64);
        }
    }
    out
}
