use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use slopewatch_parser::{DisplacementSeries, ParsedSurvey};
use tracing::info;

use crate::derive;
use crate::error::{PipelineError, Result};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01, used to express dates as
/// epoch day counts for the polars Date dtype.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// The cleaned, sorted, derived-field-augmented table every downstream
/// consumer reads. Immutable after construction: filtering produces a new
/// table, and the derived columns are recomputed whenever the row sequence
/// changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    layout: &'static str,
    dates: Vec<NaiveDate>,
    series: Vec<DisplacementSeries>,
    precipitation: Vec<Option<f64>>,
    cumulative_displacement: Vec<Option<f64>>,
    rate_of_change: Vec<Option<f64>>,
}

impl CanonicalTable {
    /// Normalize a parsed survey: stable-sort ascending by date, drop
    /// duplicate dates (first occurrence wins), then derive the cumulative
    /// and rate columns.
    pub fn from_survey(parsed: ParsedSurvey) -> Result<Self> {
        let columns = parsed.columns;
        if !columns.is_aligned() {
            return Err(PipelineError::Validation(
                "survey columns are not row-aligned".to_string(),
            ));
        }

        let mut order: Vec<usize> = (0..columns.dates.len()).collect();
        order.sort_by_key(|&idx| columns.dates[idx]);

        let mut keep: Vec<usize> = Vec::with_capacity(order.len());
        let mut previous: Option<NaiveDate> = None;
        for idx in order {
            let date = columns.dates[idx];
            if previous != Some(date) {
                keep.push(idx);
                previous = Some(date);
            }
        }

        let dates: Vec<NaiveDate> = keep.iter().map(|&idx| columns.dates[idx]).collect();
        let series: Vec<DisplacementSeries> = columns
            .displacement
            .iter()
            .map(|series| DisplacementSeries {
                name: series.name.clone(),
                values: keep.iter().map(|&idx| series.values[idx]).collect(),
            })
            .collect();
        let precipitation: Vec<Option<f64>> =
            keep.iter().map(|&idx| columns.precipitation[idx]).collect();

        let table = Self::with_derived(parsed.layout, dates, series, precipitation);
        info!(
            layout = table.layout,
            rows = table.height(),
            series = table.series.len(),
            "built canonical table"
        );
        Ok(table)
    }

    fn with_derived(
        layout: &'static str,
        dates: Vec<NaiveDate>,
        series: Vec<DisplacementSeries>,
        precipitation: Vec<Option<f64>>,
    ) -> Self {
        let cumulative_displacement = series
            .first()
            .map(|first| derive::cumulative_displacement(&first.values))
            .unwrap_or_else(|| vec![None; dates.len()]);
        let rate_of_change = derive::rate_of_change(&dates, &series);

        Self {
            layout,
            dates,
            series,
            precipitation,
            cumulative_displacement,
            rate_of_change,
        }
    }

    pub fn layout(&self) -> &'static str {
        self.layout
    }

    pub fn height(&self) -> usize {
        self.dates.len()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn series(&self) -> &[DisplacementSeries] {
        &self.series
    }

    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|series| series.name.as_str()).collect()
    }

    pub fn series_values(&self, name: &str) -> Option<&[Option<f64>]> {
        self.series
            .iter()
            .find(|series| series.name == name)
            .map(|series| series.values.as_slice())
    }

    pub fn precipitation(&self) -> &[Option<f64>] {
        &self.precipitation
    }

    pub fn cumulative_displacement(&self) -> &[Option<f64>] {
        &self.cumulative_displacement
    }

    pub fn rate_of_change(&self) -> &[Option<f64>] {
        &self.rate_of_change
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// Restrict to the inclusive date window. Pure: the receiver is left
    /// untouched and the view's derived columns are recomputed over the
    /// surviving rows.
    pub fn filter_range(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        let keep: Vec<usize> = (0..self.height())
            .filter(|&idx| {
                let date = self.dates[idx];
                from.map_or(true, |start| date >= start) && to.map_or(true, |end| date <= end)
            })
            .collect();

        let dates = keep.iter().map(|&idx| self.dates[idx]).collect();
        let series = self
            .series
            .iter()
            .map(|series| DisplacementSeries {
                name: series.name.clone(),
                values: keep.iter().map(|&idx| series.values[idx]).collect(),
            })
            .collect();
        let precipitation = keep.iter().map(|&idx| self.precipitation[idx]).collect();

        Self::with_derived(self.layout, dates, series, precipitation)
    }

    /// Date and value of the maximum rate of change; ties resolve to the
    /// first occurrence in sorted order.
    pub fn fastest_movement(&self) -> Option<(NaiveDate, f64)> {
        let mut best: Option<(NaiveDate, f64)> = None;
        for (idx, rate) in self.rate_of_change.iter().enumerate() {
            let Some(rate) = rate else { continue };
            if best.map_or(true, |(_, current)| *rate > current) {
                best = Some((self.dates[idx], *rate));
            }
        }
        best
    }

    /// Chart-builder interface: `timestamp` (Date), one float column per
    /// displacement series, `precipitation`, and the two derived columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let epoch_days: Vec<i32> = self
            .dates
            .iter()
            .map(|date| date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();
        let ts_series = Series::new("timestamp".into(), epoch_days).cast(&DataType::Date)?;

        let mut cols: Vec<Column> = Vec::with_capacity(self.series.len() + 4);
        cols.push(ts_series.into());
        for series in &self.series {
            cols.push(Series::new(series.name.as_str().into(), series.values.clone()).into());
        }
        cols.push(Series::new("precipitation".into(), self.precipitation.clone()).into());
        cols.push(
            Series::new(
                "cumulative_displacement".into(),
                self.cumulative_displacement.clone(),
            )
            .into(),
        );
        cols.push(Series::new("rate_of_change".into(), self.rate_of_change.clone()).into());

        DataFrame::new(cols).map_err(PipelineError::from)
    }
}
