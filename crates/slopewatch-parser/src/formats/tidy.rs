use std::cmp::Ordering;

use csv::{ReaderBuilder, StringRecord};

use crate::config::DetectionConfig;
use crate::errors::ParserError;
use crate::model::{DisplacementSeries, ParsedSurvey, SurveyColumns};
use crate::registry::SurveyParser;

use super::{coerce_f64, parse_dayfirst_date, record_is_blank, sniff_delimiter, strip_bom};

/// Layout A: a header names the date column and the precipitation column
/// outright; every other named column is a displacement series. Rows keep
/// partially-missing measurements as long as the date parses.
pub struct TidyLayoutParser;

impl Default for TidyLayoutParser {
    fn default() -> Self {
        Self
    }
}

struct HeaderPlan {
    date_index: usize,
    precipitation_index: usize,
    /// Column index and cleaned name, ordered by numeric parse of the name.
    displacement: Vec<(usize, String)>,
}

impl TidyLayoutParser {
    const NAME: &'static str = "TIDY";

    fn classify_header(
        header: &StringRecord,
        config: &DetectionConfig,
    ) -> Result<HeaderPlan, ParserError> {
        let mut date_index = None;
        let mut precipitation_index = None;
        let mut displacement = Vec::new();

        for (idx, raw) in header.iter().enumerate() {
            let name = raw.trim();
            // Spreadsheet exports pad trailing empty columns as "Unnamed: N".
            if name.is_empty() || name.starts_with("Unnamed") {
                continue;
            }
            if date_index.is_none() && config.is_date_header(name) {
                date_index = Some(idx);
            } else if precipitation_index.is_none() && config.is_precipitation_header(name) {
                precipitation_index = Some(idx);
            } else {
                displacement.push((idx, name.to_string()));
            }
        }

        let date_index = date_index.ok_or_else(|| ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: "no recognizable date column in header".to_string(),
        })?;
        let precipitation_index =
            precipitation_index.ok_or_else(|| ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: "no recognizable precipitation column in header".to_string(),
            })?;

        if displacement.is_empty() {
            return Err(ParserError::InvalidHeader {
                parser: Self::NAME,
                message: "no displacement series columns found".to_string(),
            });
        }

        displacement.sort_by(|a, b| Self::compare_series_names(&a.1, &b.1));

        Ok(HeaderPlan {
            date_index,
            precipitation_index,
            displacement,
        })
    }

    /// Series columns are named after sensor identifiers, usually plain
    /// numbers; sort those numerically and push non-numeric names after them.
    fn compare_series_names(a: &str, b: &str) -> Ordering {
        match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        }
    }
}

impl SurveyParser for TidyLayoutParser {
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

        let mut records = reader.records();

        let header = records
            .next()
            .ok_or(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: "file is empty".to_string(),
            })?
            .map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;

        if record_is_blank(&header) {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: "header row is blank".to_string(),
            });
        }

        let plan = Self::classify_header(&header, config)?;

        let mut columns = SurveyColumns::default();
        for (_, name) in &plan.displacement {
            columns.displacement.push(DisplacementSeries::new(name.clone()));
        }

        for record in records {
            let record = record.map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;

            if record_is_blank(&record) {
                continue;
            }

            // Unparsable dates drop the whole row; everything else is kept
            // with per-cell missing values.
            let Some(date) = record
                .get(plan.date_index)
                .and_then(parse_dayfirst_date)
            else {
                continue;
            };

            columns.dates.push(date);
            for (series, (col_idx, _)) in
                columns.displacement.iter_mut().zip(&plan.displacement)
            {
                series
                    .values
                    .push(record.get(*col_idx).and_then(coerce_f64));
            }
            columns
                .precipitation
                .push(record.get(plan.precipitation_index).and_then(coerce_f64));
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
