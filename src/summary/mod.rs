// src/summary/mod.rs
//! Read-side KPIs over a normalized traffic CSV: totals, coverage, a
//! year-month series and top stations/departments.

use crate::process::utils::{parse_number, parse_whole_number};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};
use tracing::{debug, instrument};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

mod format;

pub use format::{format_count, render_text};

/// Fold a station or department name for grouping: accents stripped,
/// upper-cased, trimmed. `" Bogotá "` and `"BOGOTA"` fold together.
pub fn normalize_name(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
        .trim()
        .to_string()
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    estacion: String,
    anio: String,
    mes: String,
    departamento: String,
    trafico_total: String,
}

/// One row of the normalized CSV as the summary sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub estacion: String,
    pub departamento: String,
    pub anio: i64,
    pub mes: Option<u32>,
    pub trafico_total: f64,
}

impl SummaryRow {
    /// `None` when the year is unusable.
    fn from_csv(row: CsvRow) -> Option<Self> {
        Some(Self {
            anio: parse_whole_number(&row.anio)?,
            mes: parse_whole_number(&row.mes)
                .filter(|m| (1..=12).contains(m))
                .map(|m| m as u32),
            trafico_total: parse_number(&row.trafico_total).unwrap_or(0.0),
            estacion: normalize_name(&row.estacion),
            departamento: normalize_name(&row.departamento),
        })
    }
}

/// Load a CSV written by the normalizer. Columns are matched by name, so
/// extra columns are ignored.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_normalized<P: AsRef<Path>>(path: P) -> Result<Vec<SummaryRow>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to open normalized CSV: {:?}", path))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (idx, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let raw = result.with_context(|| format!("CSV parse error in {:?} at row {}", path, idx))?;
        match SummaryRow::from_csv(raw) {
            Some(r) => rows.push(r),
            None => skipped += 1,
        }
    }
    debug!(rows = rows.len(), skipped, "normalized CSV loaded");
    Ok(rows)
}

/// Optional equality filters; names are compared after [`normalize_name`].
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub anio: Option<i64>,
    pub mes: Option<u32>,
    pub departamento: Option<String>,
    pub estacion: Option<String>,
}

impl Filters {
    pub fn matches(&self, row: &SummaryRow) -> bool {
        if self.anio.is_some_and(|y| y != row.anio) {
            return false;
        }
        if self.mes.is_some() && self.mes != row.mes {
            return false;
        }
        if let Some(d) = &self.departamento {
            if normalize_name(d) != row.departamento {
                return false;
            }
        }
        if let Some(e) = &self.estacion {
            if normalize_name(e) != row.estacion {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    pub period: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub total: f64,
    /// Percent of the filtered total.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: f64,
    pub rows: usize,
    pub departments: usize,
    pub stations: usize,
    pub timeseries: Vec<PeriodTotal>,
    pub top_stations: Vec<Ranked>,
    pub top_departments: Vec<Ranked>,
}

/// `YYYY-MM`, or `YYYY-null` when the month is unknown.
fn period_key(row: &SummaryRow) -> String {
    match row.mes {
        Some(m) => format!("{}-{:02}", row.anio, m),
        None => format!("{}-null", row.anio),
    }
}

fn sum_by<'a, F>(rows: &[&'a SummaryRow], key: F) -> BTreeMap<String, f64>
where
    F: Fn(&'a SummaryRow) -> String,
{
    let mut sums = BTreeMap::new();
    for r in rows {
        *sums.entry(key(*r)).or_insert(0.0) += r.trafico_total;
    }
    sums
}

/// Largest `n` groups by total; ties keep name order.
fn top_n(sums: BTreeMap<String, f64>, n: usize, total: f64) -> Vec<Ranked> {
    let mut ranked: Vec<(String, f64)> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(n)
        .map(|(name, v)| Ranked {
            share: if total != 0.0 { v / total * 100.0 } else { 0.0 },
            name,
            total: v,
        })
        .collect()
}

fn distinct_names<'a, I: Iterator<Item = &'a str>>(names: I) -> usize {
    names
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn summarize(rows: &[SummaryRow], filters: &Filters, top: usize) -> Summary {
    let filtered: Vec<&SummaryRow> = rows.iter().filter(|r| filters.matches(r)).collect();
    let total: f64 = filtered.iter().map(|r| r.trafico_total).sum();

    let timeseries = sum_by(&filtered, period_key)
        .into_iter()
        .map(|(period, total)| PeriodTotal { period, total })
        .collect();

    Summary {
        total,
        rows: filtered.len(),
        departments: distinct_names(filtered.iter().map(|r| r.departamento.as_str())),
        stations: distinct_names(filtered.iter().map(|r| r.estacion.as_str())),
        timeseries,
        top_stations: top_n(sum_by(&filtered, |r| r.estacion.clone()), top, total),
        top_departments: top_n(sum_by(&filtered, |r| r.departamento.clone()), top, total),
    }
}
