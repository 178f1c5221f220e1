//! Number and date formatting for the report.
//!
//! Dates render in Spanish; the short form feeds the suggested filename.
//! Month tables follow the Peruvian convention ("Setiembre").

use chrono::{Datelike, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) const MESES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Setiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

pub(crate) const MESES_CORTO: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Set", "Oct", "Nov", "Dic",
];

/// "INICIO 5/9/2025" collapses to "INICIO" in axis labels and tables.
static INICIO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"INICIO \d+/\d+/\d+").unwrap());

/// Thousands-separated amount with two decimals: `1234567.891` → `"1,234,567.89"`.
pub fn fmt_money(n: f64) -> String {
    let fixed = format!("{:.2}", n.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let int_grouped: String = grouped.chars().rev().collect();
    let sign = if n < 0.0 { "-" } else { "" };
    format!("{sign}{int_grouped}.{dec_part}")
}

/// A stored fraction as a display percentage: `0.1234` → `"12.34%"`.
pub fn fmt_fraction_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Long Spanish date: "22 de Febrero de 2026".
pub fn format_date_long(date: NaiveDateTime) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MESES[date.month0() as usize],
        date.year()
    )
}

/// Short date for filenames: "22-Feb-2026".
pub fn format_date_short(date: NaiveDateTime) -> String {
    format!(
        "{:02}-{}-{}",
        date.day(),
        MESES_CORTO[date.month0() as usize],
        date.year()
    )
}

pub(crate) fn clean_month_label(mes: &str) -> String {
    INICIO_DATE.replace(mes, "INICIO").into_owned()
}

/// HTML-escape a string.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn money_grouping() {
        assert_eq!(fmt_money(1_234_567.891), "1,234,567.89");
        assert_eq!(fmt_money(999.5), "999.50");
        assert_eq!(fmt_money(0.0), "0.00");
        assert_eq!(fmt_money(-12_000.0), "-12,000.00");
    }

    #[test]
    fn fraction_to_percent() {
        assert_eq!(fmt_fraction_pct(0.1234), "12.34%");
        assert_eq!(fmt_fraction_pct(1.0), "100.00%");
    }

    #[test]
    fn spanish_dates() {
        assert_eq!(format_date_long(date(2026, 2, 22)), "22 de Febrero de 2026");
        assert_eq!(format_date_short(date(2026, 2, 22)), "22-Feb-2026");
        assert_eq!(format_date_short(date(2025, 9, 5)), "05-Set-2025");
    }

    #[test]
    fn inicio_label_cleanup() {
        assert_eq!(clean_month_label("INICIO 5/9/2025"), "INICIO");
        assert_eq!(clean_month_label("SET 2025"), "SET 2025");
    }

    #[test]
    fn html_escape_works() {
        assert_eq!(html_escape("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
    }
}
