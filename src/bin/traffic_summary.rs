use anyhow::Result;
use clap::Parser;
use peajes::summary::{self, Filters};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// KPIs over a normalized toll-traffic CSV.
#[derive(Debug, Parser)]
#[command(name = "traffic-summary", version, about)]
struct Args {
    /// CSV written by `peajes`.
    #[arg(default_value = "data_trafico_total.csv")]
    path: PathBuf,

    #[arg(long)]
    anio: Option<i64>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    mes: Option<u32>,

    #[arg(long)]
    departamento: Option<String>,

    #[arg(long)]
    estacion: Option<String>,

    /// Stations and departments to rank.
    #[arg(long, default_value_t = 12)]
    top: usize,

    /// Print JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let rows = summary::load_normalized(&args.path)?;
    let filters = Filters {
        anio: args.anio,
        mes: args.mes,
        departamento: args.departamento,
        estacion: args.estacion,
    };
    let report = summary::summarize(&rows, &filters, args.top);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", summary::render_text(&report));
    }
    Ok(())
}
