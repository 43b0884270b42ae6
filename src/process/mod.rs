// src/process/mod.rs
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub mod columns;
pub mod convert;
pub mod month;
pub mod utils;
pub mod write;

pub use columns::{ColumnMap, Field};
pub use convert::{MissingText, TrafficRecord};

/// Sheet the traffic export keeps its records in.
pub const DEFAULT_SHEET: &str = "Data";

#[derive(Debug)]
pub struct RawTable {
    /// Header row as the file spells it, encoding artifacts included.
    pub headers: Vec<String>,
    /// Data rows, one cell per header; `None` marks an empty cell.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table from a header row followed by data rows. Ragged rows are
    /// padded with empty cells and blank headers get a positional name.
    fn from_records<I>(mut records: I) -> Self
    where
        I: Iterator<Item = Vec<Option<String>>>,
    {
        let headers: Vec<String> = records
            .next()
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, h)| match h {
                Some(h) if !h.is_empty() => h,
                _ => format!("Unnamed: {}", i),
            })
            .collect();
        let width = headers.len();
        let rows = records
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, None);
                }
                row
            })
            .collect();
        Self { headers, rows }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub sheet: String,
    pub missing_text: MissingText,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_SHEET.to_string(),
            missing_text: MissingText::default(),
        }
    }
}

/// Outcome of one normalization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output: PathBuf,
    pub rows: usize,
    pub null_months: usize,
}

/// Render a spreadsheet cell as text; empty and error cells are missing.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(utils::format_float(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(|d: chrono::NaiveDateTime| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| utils::format_float(dt.as_f64())),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

fn load_workbook(path: &Path, sheet: &str) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {:?}", path))?;
    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == sheet) {
        return Err(anyhow!(
            "workbook {:?} has no sheet named {:?} (found {:?})",
            path,
            sheet,
            names
        ));
    }
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read sheet {:?} from {:?}", sheet, path))?;
    debug!(sheet, rows = range.height(), cols = range.width(), "sheet loaded");

    Ok(RawTable::from_records(
        range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>()),
    ))
}

fn load_csv(path: &Path) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {:?} at record {}", path, idx))?;
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|s| (!s.is_empty()).then(|| s.to_string()))
            .collect();
        if idx == 0 {
            if let Some(Some(first)) = row.first_mut() {
                *first = first.trim_start_matches('\u{feff}').to_string();
            }
        }
        records.push(row);
    }
    Ok(RawTable::from_records(records.into_iter()))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Sheet names of a workbook; CSV files have none.
pub fn sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    if is_csv(path) {
        return Ok(Vec::new());
    }
    let workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {:?}", path))?;
    Ok(workbook.sheet_names())
}

/// Load the traffic table from `path`. `.csv` files are read directly; every
/// other extension is treated as a workbook and `sheet` is read from it.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P, sheet: &str) -> Result<RawTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow!("input file {:?} does not exist", path));
    }
    let table = if is_csv(path) {
        load_csv(path)?
    } else {
        load_workbook(path, sheet)?
    };
    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded input table"
    );
    Ok(table)
}

/// Read `input`, normalize it and write the fixed-schema CSV to `output`.
#[instrument(level = "info", skip(input, output, options), fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &NormalizeOptions,
) -> Result<RunReport> {
    let table = load_table(&input, &options.sheet)?;
    let columns = ColumnMap::resolve(&table.headers)?;
    debug!(?columns, "resolved columns");

    let records = convert::normalize_rows(&table, &columns, options.missing_text);
    let dropped = table.rows.len() - records.len();
    if dropped > 0 {
        info!(dropped, "dropped rows without a year");
    }

    let batch = convert::to_record_batch(&records)?;
    write::write_csv(&batch, output.as_ref())?;

    let null_months = records.iter().filter(|r| r.mes.is_none()).count();
    Ok(RunReport {
        output: output.as_ref().to_path_buf(),
        rows: records.len(),
        null_months,
    })
}
