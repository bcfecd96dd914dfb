use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::table::CanonicalTable;

/// Descriptive statistics for one column, in the shape of a pandas
/// `describe()` row. All fields except `count` are `None` when the column
/// has no present values; `std` needs at least two.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl SeriesSummary {
    pub fn from_values(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        let mut present: Vec<f64> = values.iter().copied().flatten().collect();
        present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = present.len();
        if count == 0 {
            return Self {
                name: name.into(),
                count,
                mean: None,
                std: None,
                min: None,
                q1: None,
                median: None,
                q3: None,
                max: None,
            };
        }

        let mean = present.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let variance = present
                .iter()
                .map(|value| (value - mean).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            Some(variance.sqrt())
        } else {
            None
        };

        Self {
            name: name.into(),
            count,
            mean: Some(mean),
            std,
            min: Some(present[0]),
            q1: Some(quantile(&present, 0.25)),
            median: Some(quantile(&present, 0.5)),
            q3: Some(quantile(&present, 0.75)),
            max: Some(present[count - 1]),
        }
    }
}

/// Row where a column reaches its maximum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeRow {
    pub date: NaiveDate,
    pub column: String,
    pub value: f64,
}

/// Pure function of a canonical table (or filtered view); recomputed on
/// every filter change, no hidden state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    pub series: Vec<SeriesSummary>,
    pub precipitation: SeriesSummary,
    pub total_precipitation: f64,
    pub mean_precipitation: Option<f64>,
    /// Displacement series the correlation was computed against.
    pub correlation_series: String,
    /// Pearson correlation between the chosen series and precipitation.
    pub correlation: Option<f64>,
    pub max_displacement: Option<ExtremeRow>,
    pub max_precipitation: Option<ExtremeRow>,
    pub fastest_movement: Option<ExtremeRow>,
}

pub fn compute_stats(table: &CanonicalTable, chosen_series: Option<&str>) -> Result<TableStats> {
    let chosen = match chosen_series {
        Some(name) => table
            .series()
            .iter()
            .find(|series| series.name == name)
            .ok_or_else(|| {
                PipelineError::Validation(format!("unknown displacement series '{name}'"))
            })?,
        None => table.series().first().ok_or_else(|| {
            PipelineError::Validation("table has no displacement series".to_string())
        })?,
    };

    let series = table
        .series()
        .iter()
        .map(|entry| SeriesSummary::from_values(entry.name.clone(), &entry.values))
        .collect();
    let precipitation = SeriesSummary::from_values("precipitation", table.precipitation());

    let present_precipitation: Vec<f64> =
        table.precipitation().iter().copied().flatten().collect();
    let total_precipitation = present_precipitation.iter().sum::<f64>();
    let mean_precipitation = if present_precipitation.is_empty() {
        None
    } else {
        Some(total_precipitation / present_precipitation.len() as f64)
    };

    let correlation = pearson(&chosen.values, table.precipitation());

    let max_displacement = table
        .series()
        .iter()
        .flat_map(|entry| {
            entry
                .values
                .iter()
                .enumerate()
                .filter_map(|(idx, value)| {
                    value.map(|value| ExtremeRow {
                        date: table.dates()[idx],
                        column: entry.name.clone(),
                        value,
                    })
                })
        })
        .fold(None::<ExtremeRow>, fold_max);
    let max_precipitation = table
        .precipitation()
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| {
            value.map(|value| ExtremeRow {
                date: table.dates()[idx],
                column: "precipitation".to_string(),
                value,
            })
        })
        .fold(None::<ExtremeRow>, fold_max);

    let fastest_movement = table.fastest_movement().map(|(date, value)| ExtremeRow {
        date,
        column: "rate_of_change".to_string(),
        value,
    });

    Ok(TableStats {
        series,
        precipitation,
        total_precipitation,
        mean_precipitation,
        correlation_series: chosen.name.clone(),
        correlation,
        max_displacement,
        max_precipitation,
        fastest_movement,
    })
}

/// Keeps the first occurrence on ties (strict greater-than).
fn fold_max(best: Option<ExtremeRow>, candidate: ExtremeRow) -> Option<ExtremeRow> {
    match best {
        Some(best) if best.value >= candidate.value => Some(best),
        _ => Some(candidate),
    }
}

/// Linear-interpolation quantile over an ascending-sorted slice, matching
/// the pandas `describe()` default.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Pearson correlation over the rows where both columns are present.
/// `None` below two pairs or when either side has zero variance.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(covariance / denominator)
}
