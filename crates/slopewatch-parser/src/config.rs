use serde::Deserialize;

/// Tunable knobs for the layout-detection heuristics.
///
/// Header matching is case-insensitive and applied after trimming. The
/// threshold is the magnitude cutoff that marks a numeric column as
/// precipitation in legacy exports (monthly rainfall in mm is far larger
/// than displacement readings in cm).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub date_headers: Vec<String>,
    pub precipitation_headers: Vec<String>,
    pub precipitation_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            date_headers: vec!["fecha".to_string(), "date".to_string()],
            precipitation_headers: vec![
                "rainfall(mm)".to_string(),
                "rainfall".to_string(),
                "precipitation".to_string(),
                "precipitacion(mm)".to_string(),
                "precipitacion".to_string(),
            ],
            precipitation_threshold: 10.0,
        }
    }
}

impl DetectionConfig {
    pub fn is_date_header(&self, name: &str) -> bool {
        let trimmed = name.trim();
        self.date_headers
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    }

    pub fn is_precipitation_header(&self, name: &str) -> bool {
        let trimmed = name.trim();
        self.precipitation_headers
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    }
}
