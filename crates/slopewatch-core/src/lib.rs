pub mod cache;
pub mod derive;
pub mod error;
pub mod export;
pub mod stats;
pub mod table;

pub use cache::TableCache;
pub use error::{PipelineError, Result};
pub use stats::{compute_stats, ExtremeRow, SeriesSummary, TableStats};
pub use table::CanonicalTable;
