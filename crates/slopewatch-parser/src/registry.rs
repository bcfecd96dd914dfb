use crate::config::DetectionConfig;
use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{LegacyExportParser, TidyLayoutParser};
use crate::model::ParsedSurvey;

pub trait SurveyParser {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &str, config: &DetectionConfig)
        -> Result<ParsedSurvey, ParserError>;
}

/// Run the ranked parser list against an uploaded file. The tidy layout is
/// tried first because it is recognized by explicit header names; the legacy
/// export falls back on magnitude heuristics.
pub fn parse_survey_file(
    content: &str,
    config: &DetectionConfig,
) -> Result<ParsedSurvey, ParserError> {
    let tidy = TidyLayoutParser;
    let legacy = LegacyExportParser;
    let parsers: [&dyn SurveyParser; 2] = [&tidy, &legacy];
    parse_with_parsers(content, config, &parsers)
}

pub fn parse_with_parsers(
    content: &str,
    config: &DetectionConfig,
    parsers: &[&dyn SurveyParser],
) -> Result<ParsedSurvey, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(content, config) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
