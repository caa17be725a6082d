//! Null-safe display formatters.
//!
//! Every formatter takes an `Option` and renders absence as an explicit
//! token instead of empty space: [`MISSING`] for compact contexts (map
//! tooltips, plain values) and [`NOT_AVAILABLE`] for the loading-aware
//! variants used by the insight cards.

use std::fmt::Display;

/// Compact token for an absent value.
pub const MISSING: &str = "--";

/// Verbose token for an absent value.
pub const NOT_AVAILABLE: &str = "Not available";

/// Token shown while a value is still being fetched.
pub const LOADING: &str = "Loading…";

/// Formats any displayable value, or [`MISSING`].
#[must_use]
pub fn format_value<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

/// Loading-aware variant of [`format_value`].
#[must_use]
pub fn format_value_with_loading<T: Display>(value: Option<T>, is_loading: bool) -> String {
    with_loading(value, is_loading, |v| v.to_string())
}

/// Formats a plain percentage (`87` → `"87%"`).
#[must_use]
pub fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), percent)
}

/// Loading-aware variant of [`format_percent`].
#[must_use]
pub fn format_percent_with_loading(value: Option<f64>, is_loading: bool) -> String {
    with_loading(value, is_loading, percent)
}

/// Formats a percentage with an explicit sign for non-negative values
/// (`12.4` → `"+12.4%"`, `-3` → `"-3%"`).
#[must_use]
pub fn format_signed_percent(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), signed_percent)
}

/// Loading-aware variant of [`format_signed_percent`].
#[must_use]
pub fn format_signed_percent_with_loading(value: Option<f64>, is_loading: bool) -> String {
    with_loading(value, is_loading, signed_percent)
}

/// Formats an index value with two decimals (`0.73` → `"0.73"`).
#[must_use]
pub fn format_index(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), index)
}

/// Loading-aware variant of [`format_index`].
#[must_use]
pub fn format_index_with_loading(value: Option<f64>, is_loading: bool) -> String {
    with_loading(value, is_loading, index)
}

/// Rounds `value` to an integer and inserts thousands separators
/// (`24580.0` → `"24,580"`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn with_loading<T>(value: Option<T>, is_loading: bool, f: impl FnOnce(T) -> String) -> String {
    if is_loading {
        return LOADING.to_string();
    }
    value.map_or_else(|| NOT_AVAILABLE.to_string(), f)
}

// `-0.0` would otherwise print as "-0".
fn normalize_zero(value: f64) -> f64 {
    value + 0.0
}

fn percent(value: f64) -> String {
    format!("{}%", normalize_zero(value))
}

fn signed_percent(value: f64) -> String {
    let value = normalize_zero(value);
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value}%")
}

fn index(value: f64) -> String {
    format!("{:.2}", normalize_zero(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_percent_cases() {
        assert_eq!(format_signed_percent(None), "--");
        assert_eq!(format_signed_percent(Some(12.4)), "+12.4%");
        assert_eq!(format_signed_percent(Some(-3.0)), "-3%");
        assert_eq!(format_signed_percent(Some(0.0)), "+0%");
        assert_eq!(format_signed_percent(Some(-0.0)), "+0%");
    }

    #[test]
    fn loading_takes_precedence_over_value() {
        assert_eq!(format_signed_percent_with_loading(Some(1.5), true), LOADING);
        assert_eq!(format_percent_with_loading(None, false), NOT_AVAILABLE);
        assert_eq!(format_index_with_loading(Some(0.5), false), "0.50");
        assert_eq!(format_value_with_loading(Some("Gaya"), false), "Gaya");
    }

    #[test]
    fn plain_formatters_use_compact_token() {
        assert_eq!(format_value::<&str>(None), MISSING);
        assert_eq!(format_percent(Some(87.0)), "87%");
        assert_eq!(format_index(Some(0.731)), "0.73");
        assert_eq!(format_index(None), "--");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(24_580.0), "24,580");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1_000_000.0), "1,000,000");
        assert_eq!(group_thousands(-12_345.4), "-12,345");
        assert_eq!(group_thousands(0.0), "0");
    }
}
