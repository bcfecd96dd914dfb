use chrono::NaiveDate;

/// One named displacement series, row-aligned with the survey dates.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl DisplacementSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }
}

/// Raw column vectors extracted from one upload, before normalization.
///
/// Every vector has one entry per surviving row; alignment is guaranteed by
/// the parsers and re-checked when the canonical table is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyColumns {
    pub dates: Vec<NaiveDate>,
    pub displacement: Vec<DisplacementSeries>,
    pub precipitation: Vec<Option<f64>>,
}

impl SurveyColumns {
    pub fn height(&self) -> usize {
        self.dates.len()
    }

    /// true when every column vector carries one value per row.
    pub fn is_aligned(&self) -> bool {
        let rows = self.dates.len();
        self.precipitation.len() == rows
            && self
                .displacement
                .iter()
                .all(|series| series.values.len() == rows)
    }
}

/// Output of a successful layout detection + extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSurvey {
    /// Name of the parser that recognized the file.
    pub layout: &'static str,
    pub columns: SurveyColumns,
}
