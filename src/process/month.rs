use crate::process::utils::parse_whole_number;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Spanish month names, including the "setiembre" spelling used in Peru and
/// parts of the Andes.
static MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("enero", 1),
        ("febrero", 2),
        ("marzo", 3),
        ("abril", 4),
        ("mayo", 5),
        ("junio", 6),
        ("julio", 7),
        ("agosto", 8),
        ("septiembre", 9),
        ("setiembre", 9),
        ("octubre", 10),
        ("noviembre", 11),
        ("diciembre", 12),
    ])
});

/// Resolve a raw month cell to 1..=12.
///
/// Tries the name table first (case and surrounding whitespace ignored), then
/// a plain numeric parse for months already stored as numbers. Anything else,
/// including numbers outside 1..=12, gives `None`.
pub fn parse_month(raw: &str) -> Option<u32> {
    let cleaned = raw.trim();
    if let Some(&m) = MONTHS.get(cleaned.to_lowercase().as_str()) {
        return Some(m);
    }
    parse_whole_number(cleaned)
        .filter(|m| (1..=12).contains(m))
        .map(|m| m as u32)
}
