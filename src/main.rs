use anyhow::Result;
use clap::Parser;
use peajes::process::{self, MissingText, NormalizeOptions, DEFAULT_SHEET};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Normalize a toll-station traffic workbook into a flat CSV.
#[derive(Debug, Parser)]
#[command(name = "peajes", version, about)]
struct Args {
    /// Workbook (or CSV export) to read.
    #[arg(short, long, env = "PEAJES_INPUT", default_value = "data/trafico.xlsx")]
    input: PathBuf,

    /// CSV file to write; parent directories are created.
    #[arg(
        short,
        long,
        env = "PEAJES_OUTPUT",
        default_value = "data_trafico_total.csv"
    )]
    output: PathBuf,

    /// Sheet holding the records.
    #[arg(long, env = "PEAJES_SHEET", default_value = DEFAULT_SHEET)]
    sheet: String,

    /// Write missing text cells as the literal `nan` instead of leaving them empty.
    #[arg(long)]
    nan_placeholder: bool,
}

fn main() -> Result<()> {
    // logs go to stderr; stdout carries the run summary
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(input = %args.input.display(), sheet = %args.sheet, "startup");

    let options = NormalizeOptions {
        sheet: args.sheet,
        missing_text: if args.nan_placeholder {
            MissingText::Placeholder
        } else {
            MissingText::Empty
        },
    };
    let report = process::normalize_file(&args.input, &args.output, &options)?;

    println!("Wrote {} rows {}", report.output.display(), report.rows);
    println!("Mes nulls {}", report.null_months);
    Ok(())
}
