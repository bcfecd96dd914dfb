mod common;
mod legacy_export;
mod tidy;

pub use legacy_export::LegacyExportParser;
pub use tidy::TidyLayoutParser;

pub(crate) use common::{
    coerce_f64, excel_serial_to_date, parse_dayfirst_date, record_is_blank, sniff_delimiter,
    strip_bom,
};
