use chrono::NaiveDate;

/// Parses a cell as a number, treating blanks and garbage as zero.
///
/// Data-entry mistakes in numeric columns are tolerated rather than raised;
/// callers see `0.0` for anything that is not a finite number.
pub fn coerce_number(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Canonical calendar-day key used in every `date` column.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Renders a number for storage: integral values without a fraction, no `-0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".into();
    }
    format!("{}", value)
}

/// Flag semantics for `config_prices` values.
pub fn is_truthy(raw: &str) -> bool {
    let value = raw.trim().to_ascii_lowercase();
    if matches!(value.as_str(), "1" | "true" | "yes" | "y" | "on") {
        return true;
    }
    value.parse::<f64>().map(|n| n != 0.0 && n.is_finite()).unwrap_or(false)
}
