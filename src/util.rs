// Parsing and formatting helpers.
//
// All the forgiving string handling lives here so the pipeline stages can
// work with clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

// Currency symbols, grouping separators and stray whitespace that show up in
// numeric cells of CSV exports.
static NUMERIC_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$€£,\s]").expect("valid regex"));

// `YYYY-MM-DD` is the preferred date form; the slash variant is common
// enough in exports to accept as well.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a numeric cell, stripping currency/formatting characters first.
///
/// Returns `None` for empty input, for values that still contain letters
/// after stripping (`"N/A"`, `"pending"`), and for anything that does not
/// parse to a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let stripped = NUMERIC_NOISE.replace_all(s, "");
    if stripped.is_empty() || stripped.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    stripped.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date cell against the accepted formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Arithmetic mean; zero for an empty slice so callers never see NaN.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().copied().sum();
    sum / values.len() as f64
}

/// Fixed-decimal rendering with thousands separators, e.g. `1,234,567.89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let negative = n.is_sign_negative() && n != 0.0;
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let int_value: i64 = int_part.parse().unwrap_or(0);
    let mut out = int_value.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

/// Thousands-separated integer rendering for counts in console and log
/// messages (e.g. `9,855 rows loaded`).
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
