pub mod config;
pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use config::DetectionConfig;
pub use errors::{ParserAttempt, ParserError};
pub use model::{DisplacementSeries, ParsedSurvey, SurveyColumns};
pub use registry::{parse_survey_file, parse_with_parsers, SurveyParser};
