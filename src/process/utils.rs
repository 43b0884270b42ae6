/// Trim surrounding whitespace.
pub fn clean_str(raw: &str) -> String {
    raw.trim().to_string()
}

/// Parse a cell as a finite decimal number. Blank, non-numeric, `nan` and
/// `inf` spellings all give `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a cell as a whole number (`"2021"`, `"2021.0"`, `" 7 "`).
pub fn parse_whole_number(raw: &str) -> Option<i64> {
    let v = parse_number(raw)?;
    if v.fract() != 0.0 || v < i64::MIN as f64 || v > i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}

/// Render a float the way a spreadsheet shows it: whole values without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
