use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use comfy_table::Table;
use slopewatch_core::{compute_stats, export, CanonicalTable, SeriesSummary};
use slopewatch_parser::{parse_survey_file, DetectionConfig};
use tracing::info;

const PREVIEW_ROWS: usize = 5;

pub fn load_config(path: Option<&Path>) -> Result<DetectionConfig> {
    let Some(path) = path else {
        return Ok(DetectionConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

fn load_table(file: &Path, config: &DetectionConfig) -> Result<CanonicalTable> {
    let bytes =
        fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let content = String::from_utf8_lossy(&bytes);
    let parsed = parse_survey_file(&content, config)
        .with_context(|| format!("could not ingest {}", file.display()))?;
    let table = CanonicalTable::from_survey(parsed)?;
    info!(
        file = %file.display(),
        layout = table.layout(),
        rows = table.height(),
        "survey loaded"
    );
    Ok(table)
}

pub fn inspect(file: &Path, config: &DetectionConfig) -> Result<()> {
    let table = load_table(file, config)?;

    println!("layout: {}", table.layout());
    println!("rows: {}", table.height());
    if let Some((first, last)) = table.date_range() {
        println!("date range: {first} .. {last}");
    }
    println!("displacement series: {}", table.series_names().join(", "));
    println!();
    println!("{}", preview(&table));
    Ok(())
}

pub fn stats(
    file: &Path,
    config: &DetectionConfig,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    series: Option<&str>,
    json: bool,
) -> Result<()> {
    let table = load_table(file, config)?.filter_range(from, to);
    ensure!(table.height() > 0, "no rows in the selected date range");

    let stats = compute_stats(&table, series)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let mut summary_table = Table::new();
    summary_table.set_header(vec![
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
    ]);
    for summary in stats.series.iter().chain([&stats.precipitation]) {
        summary_table.add_row(summary_row(summary));
    }
    println!("{summary_table}");

    println!("total precipitation: {:.1} mm", stats.total_precipitation);
    if let Some(mean) = stats.mean_precipitation {
        println!("mean precipitation: {mean:.1} mm");
    }
    match stats.correlation {
        Some(r) => println!(
            "correlation (series {} vs precipitation): {r:.3}",
            stats.correlation_series
        ),
        None => println!("correlation: undefined for this selection"),
    }
    if let Some(fastest) = &stats.fastest_movement {
        println!(
            "fastest movement: {} ({:.3} cm/day)",
            fastest.date, fastest.value
        );
    }
    if let Some(max) = &stats.max_displacement {
        println!(
            "max displacement: {:.2} cm (series {}, {})",
            max.value, max.column, max.date
        );
    }
    if let Some(max) = &stats.max_precipitation {
        println!("max precipitation: {:.1} mm ({})", max.value, max.date);
    }
    Ok(())
}

pub fn export(
    file: &Path,
    config: &DetectionConfig,
    output: Option<&Path>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    delimiter: char,
) -> Result<()> {
    ensure!(
        delimiter.is_ascii(),
        "delimiter must be a single ASCII character"
    );

    let table = load_table(file, config)?.filter_range(from, to);
    let rendered = export::to_csv_string(&table, delimiter as u8)?;

    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {} rows to {}", table.height(), path.display());
        }
        None => {
            std::io::stdout().write_all(rendered.as_bytes())?;
        }
    }
    Ok(())
}

fn preview(table: &CanonicalTable) -> Table {
    let mut out = Table::new();
    let mut header = vec!["timestamp".to_string()];
    header.extend(table.series_names().iter().map(|name| name.to_string()));
    header.push("precipitation".to_string());
    out.set_header(header);

    for idx in 0..table.height().min(PREVIEW_ROWS) {
        let mut row = vec![table.dates()[idx].to_string()];
        for series in table.series() {
            row.push(format_opt(series.values[idx]));
        }
        row.push(format_opt(table.precipitation()[idx]));
        out.add_row(row);
    }
    out
}

fn summary_row(summary: &SeriesSummary) -> Vec<String> {
    vec![
        summary.name.clone(),
        summary.count.to_string(),
        format_opt(summary.mean),
        format_opt(summary.std),
        format_opt(summary.min),
        format_opt(summary.q1),
        format_opt(summary.median),
        format_opt(summary.q3),
        format_opt(summary.max),
    ]
}

fn format_opt(value: Option<f64>) -> String {
    value.map(|value| format!("{value:.3}")).unwrap_or_else(|| "-".to_string())
}
