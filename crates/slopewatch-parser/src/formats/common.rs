use chrono::{Duration, NaiveDate};
use csv::StringRecord;

/// Days between the Excel serial epoch and 1970-01-01, with the historical
/// 2-day spreadsheet correction already folded in: calendar date =
/// 1970-01-01 + (serial - 25569) days. Serial 42338 maps to 2015-12-01.
const EXCEL_EPOCH_OFFSET_DAYS: f64 = 25569.0;

pub(crate) fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Guess the field delimiter from the first line: semicolon when it
/// outnumbers commas, comma otherwise.
pub(crate) fn sniff_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Coerce a cell to a float. Blank cells, `NaN` markers, and anything that
/// fails to parse all become missing; per-cell failures never abort a parse.
pub(crate) fn coerce_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Parse a text date with day-first convention. ISO dates are also accepted.
pub(crate) fn parse_dayfirst_date(value: &str) -> Option<NaiveDate> {
    static FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y", "%Y-%m-%d"];
    let trimmed = value.trim();
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

/// Convert an Excel serial day count to a calendar date, truncating any
/// fractional (time-of-day) part.
pub(crate) fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = (serial - EXCEL_EPOCH_OFFSET_DAYS).trunc() as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days))
}

pub(crate) fn record_is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}
