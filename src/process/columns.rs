// src/process/columns.rs
use anyhow::{bail, Result};
use std::fmt;

/// The logical input fields located by header markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Station,
    Year,
    Month,
    StationCode,
    Department,
    TotalTraffic,
}

impl Field {
    /// Resolution order.
    pub const ALL: [Field; 6] = [
        Field::Station,
        Field::Year,
        Field::Month,
        Field::StationCode,
        Field::Department,
        Field::TotalTraffic,
    ];

    /// Case-sensitive marker test against a raw header. Headers arrive with
    /// mangled accents ("Cod.EstaciÃ³n", "TrÃ¡fico Total"), so only the ASCII
    /// parts are matched.
    pub fn matches(self, header: &str) -> bool {
        match self {
            Field::Station => header.contains("Peaje"),
            Field::Year => header.starts_with('A') && header.chars().count() <= 3,
            Field::Month => header.contains("Mes"),
            Field::StationCode => header.contains('C') && header.contains("Estaci"),
            Field::Department => header.contains("Departamento"),
            Field::TotalTraffic => header.contains("Total") && header.contains("Tr"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Station => "station",
            Field::Year => "year",
            Field::Month => "month",
            Field::StationCode => "station code",
            Field::Department => "department",
            Field::TotalTraffic => "total traffic",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// First header index satisfying `field`'s marker.
pub fn find_column(headers: &[String], field: Field) -> Option<usize> {
    headers.iter().position(|h| field.matches(h))
}

/// Column indices for every logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub station: usize,
    pub year: usize,
    pub month: usize,
    pub station_code: usize,
    pub department: usize,
    pub total_traffic: usize,
}

impl ColumnMap {
    /// Resolve every field against `headers`, failing on the first field no
    /// header matches.
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let mut idx = [0usize; 6];
        for (slot, field) in idx.iter_mut().zip(Field::ALL) {
            match find_column(headers, field) {
                Some(i) => *slot = i,
                None => bail!(
                    "no column matches the {} field; headers were {:?}",
                    field,
                    headers
                ),
            }
        }
        Ok(Self {
            station: idx[0],
            year: idx[1],
            month: idx[2],
            station_code: idx[3],
            department: idx[4],
            total_traffic: idx[5],
        })
    }
}
