use std::io::Write;

use csv::WriterBuilder;

use crate::error::{PipelineError, Result};
use crate::table::CanonicalTable;

/// Serialize a table (or filtered view) back to delimited text: `timestamp`,
/// the displacement series in table order, `precipitation`, then the two
/// derived columns. ISO dates, shortest round-trip floats, missing cells
/// empty.
pub fn write_delimited<W: Write>(
    table: &CanonicalTable,
    writer: W,
    delimiter: u8,
) -> Result<()> {
    let mut out = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    let mut header = vec!["timestamp".to_string()];
    header.extend(table.series().iter().map(|series| series.name.clone()));
    header.push("precipitation".to_string());
    header.push("cumulative_displacement".to_string());
    header.push("rate_of_change".to_string());
    out.write_record(&header)?;

    for idx in 0..table.height() {
        let mut row = vec![table.dates()[idx].format("%Y-%m-%d").to_string()];
        for series in table.series() {
            row.push(format_cell(series.values[idx]));
        }
        row.push(format_cell(table.precipitation()[idx]));
        row.push(format_cell(table.cumulative_displacement()[idx]));
        row.push(format_cell(table.rate_of_change()[idx]));
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &CanonicalTable, delimiter: u8) -> Result<String> {
    let mut buffer = Vec::new();
    write_delimited(table, &mut buffer, delimiter)?;
    String::from_utf8(buffer)
        .map_err(|err| PipelineError::Processing(format!("export was not valid UTF-8: {err}")))
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
