use csv::{ReaderBuilder, StringRecord};

use crate::config::DetectionConfig;
use crate::errors::ParserError;
use crate::model::{DisplacementSeries, ParsedSurvey, SurveyColumns};
use crate::registry::SurveyParser;

use super::{coerce_f64, excel_serial_to_date, record_is_blank, sniff_delimiter, strip_bom};

/// Layout B: a semicolon-delimited spreadsheet export whose first column
/// holds Excel serial dates. The column immediately after the date is the
/// single displacement series; the precipitation column is found by
/// magnitude (first later column with any value above the threshold).
/// Rows missing displacement or precipitation are dropped entirely.
pub struct LegacyExportParser;

impl Default for LegacyExportParser {
    fn default() -> Self {
        Self
    }
}

impl LegacyExportParser {
    const NAME: &'static str = "LEGACY_EXPORT";

    const DATE_COLUMN: usize = 0;
    const DISPLACEMENT_COLUMN: usize = 1;

    /// First column at index >= 2 with any value strictly above the
    /// threshold wins. The date and displacement columns are never
    /// candidates, so the choice is driven by magnitude, not position.
    fn find_precipitation_column(
        rows: &[Vec<Option<f64>>],
        width: usize,
        threshold: f64,
    ) -> Option<usize> {
        (Self::DISPLACEMENT_COLUMN + 1..width).find(|&col| {
            rows.iter()
                .filter_map(|row| row.get(col).copied().flatten())
                .any(|value| value > threshold)
        })
    }
}

impl SurveyParser for LegacyExportParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(
        &self,
        content: &str,
        config: &DetectionConfig,
    ) -> Result<ParsedSurvey, ParserError> {
        let content = strip_bom(content);
        let delimiter = sniff_delimiter(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(content.as_bytes());

        let mut records: Vec<StringRecord> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;
            if !record_is_blank(&record) {
                records.push(record);
            }
        }

        if records.is_empty() {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: "file is empty".to_string(),
            });
        }

        // A non-numeric leading field marks a header row. A header whose
        // first name is a date column belongs to the tidy layout, not this
        // one; date names in later columns are just sensor labels.
        let header = if coerce_f64(records[0].get(Self::DATE_COLUMN).unwrap_or("")).is_none() {
            let header = records.remove(0);
            if header
                .get(Self::DATE_COLUMN)
                .map_or(false, |name| config.is_date_header(name))
            {
                return Err(ParserError::FormatMismatch {
                    parser: Self::NAME,
                    reason: "header names a date column; this is a tidy file".to_string(),
                });
            }
            Some(header)
        } else {
            None
        };

        let width = records
            .iter()
            .map(StringRecord::len)
            .chain(header.as_ref().map(StringRecord::len))
            .max()
            .unwrap_or(0);
        if width <= Self::DISPLACEMENT_COLUMN + 1 {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!(
                    "expected at least 3 columns (date, displacement, precipitation), found {width}"
                ),
            });
        }

        let numeric_rows: Vec<Vec<Option<f64>>> = records
            .iter()
            .map(|record| {
                (0..width)
                    .map(|col| record.get(col).and_then(coerce_f64))
                    .collect()
            })
            .collect();

        let precipitation_column = Self::find_precipitation_column(
            &numeric_rows,
            width,
            config.precipitation_threshold,
        )
        .ok_or_else(|| ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: format!(
                "no column exceeded the precipitation threshold ({})",
                config.precipitation_threshold
            ),
        })?;

        let series_name = header
            .as_ref()
            .and_then(|h| h.get(Self::DISPLACEMENT_COLUMN))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("displacement")
            .to_string();

        let mut columns = SurveyColumns {
            dates: Vec::new(),
            displacement: vec![DisplacementSeries::new(series_name)],
            precipitation: Vec::new(),
        };

        for row in &numeric_rows {
            let Some(date) = row[Self::DATE_COLUMN].and_then(excel_serial_to_date) else {
                continue;
            };
            // Strict non-null policy for this layout.
            let (Some(displacement), Some(precipitation)) =
                (row[Self::DISPLACEMENT_COLUMN], row[precipitation_column])
            else {
                continue;
            };

            columns.dates.push(date);
            columns.displacement[0].values.push(Some(displacement));
            columns.precipitation.push(Some(precipitation));
        }

        if columns.dates.is_empty() {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        if !columns.is_aligned() {
            return Err(ParserError::Validation {
                parser: Self::NAME,
                message: "column vectors are not row-aligned".to_string(),
            });
        }

        Ok(ParsedSurvey {
            layout: Self::NAME,
            columns,
        })
    }
}
