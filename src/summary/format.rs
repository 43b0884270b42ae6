use super::{Ranked, Summary};

/// Round to a whole number and group thousands with `.` (es-CO style).
pub fn format_count(v: f64) -> String {
    let rounded = v.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

fn push_ranked(out: &mut String, title: &str, ranked: &[Ranked]) {
    out.push_str(&format!("=== {} ===\n", title));
    if ranked.is_empty() {
        out.push_str("  (none)\n");
    }
    for (i, r) in ranked.iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:<30} {:>15} ({:.1}%)\n",
            i + 1,
            r.name,
            format_count(r.total),
            r.share
        ));
    }
}

/// Plain-text report of a [`Summary`].
pub fn render_text(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Tráfico total: {}\n", format_count(summary.total)));
    out.push_str(&format!(
        "Registros:     {}\n",
        format_count(summary.rows as f64)
    ));
    out.push_str(&format!(
        "Cobertura:     {} deptos · {} estaciones\n\n",
        summary.departments, summary.stations
    ));

    out.push_str("=== Año-Mes ===\n");
    for p in &summary.timeseries {
        out.push_str(&format!(
            "  {:<10} {:>15}\n",
            p.period,
            format_count(p.total)
        ));
    }
    out.push('\n');

    push_ranked(&mut out, "Top estaciones", &summary.top_stations);
    out.push('\n');
    push_ranked(&mut out, "Top departamentos", &summary.top_departments);
    out
}
