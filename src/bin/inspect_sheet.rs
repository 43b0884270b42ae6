use anyhow::Result;
use clap::Parser;
use peajes::process::{self, columns::find_column, Field, DEFAULT_SHEET};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Show sheets, headers and how each field resolves, without normalizing.
#[derive(Debug, Parser)]
#[command(name = "inspect-sheet", version, about)]
struct Args {
    /// Workbook or CSV export.
    path: PathBuf,

    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    println!("=== File: {} ===", args.path.display());
    let sheets = process::sheet_names(&args.path)?;
    if !sheets.is_empty() {
        println!("Sheets: {}", sheets.join(", "));
    }
    println!();

    let table = process::load_table(&args.path, &args.sheet)?;
    println!("=== Headers ({} rows) ===", table.rows.len());
    for (i, h) in table.headers.iter().enumerate() {
        println!("  [{:>2}] {:?}", i, h);
    }
    println!();

    println!("=== Fields ===");
    let mut unmatched = 0;
    for field in Field::ALL {
        match find_column(&table.headers, field) {
            Some(i) => println!("- {:<14} -> [{:>2}] {:?}", field, i, table.headers[i]),
            None => {
                unmatched += 1;
                println!("- {:<14} -> <unmatched>", field);
            }
        }
    }
    if unmatched > 0 {
        println!();
        println!("{} field(s) unmatched; normalization would fail", unmatched);
    }
    Ok(())
}
