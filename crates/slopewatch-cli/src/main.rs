use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

/// A CLI for the slopewatch displacement/rainfall pipeline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML file overriding the layout-detection defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Detect the layout of a survey file and preview its canonical rows.
    Inspect { file: PathBuf },
    /// Print descriptive statistics for a survey file.
    Stats {
        file: PathBuf,
        /// Start of the inclusive date window (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End of the inclusive date window (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Displacement series used for the correlation (default: first).
        #[arg(long)]
        series: Option<String>,
        /// Emit the statistics as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },
    /// Re-serialize a (filtered) survey file as delimited text.
    Export {
        file: PathBuf,
        /// Output path; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Field delimiter for the output.
        #[arg(long, default_value = ",")]
        delimiter: char,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Inspect { file } => commands::inspect(&file, &config),
        Command::Stats {
            file,
            from,
            to,
            series,
            json,
        } => commands::stats(&file, &config, from, to, series.as_deref(), json),
        Command::Export {
            file,
            output,
            from,
            to,
            delimiter,
        } => commands::export(&file, &config, output.as_deref(), from, to, delimiter),
    }
}
