//! Numeric Input Coercion
//!
//! Form fields hand us raw text. Anything that isn't a usable finite number
//! becomes 0; nothing is ever rejected.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid number pattern")
});

/// Parse the longest numeric prefix of `raw` ("12.5kg" → 12.5, "abc" → 0).
/// Used for bill amounts.
pub fn coerce_lenient(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    LEADING_NUMBER
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

/// Parse the whole trimmed text as a number; empty text is 0 ("12kg" → 0).
/// Used for the savings field.
pub fn coerce_strict(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match LEADING_NUMBER.find(trimmed) {
        Some(m) if m.end() == trimmed.len() => trimmed.parse::<f64>().map(finite_or_zero).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn finite_or_zero(v: f64) -> f64 {
    // -0 would otherwise render as "-0"
    if v.is_finite() && v != 0.0 {
        v
    } else {
        0.0
    }
}

/// Value shown inside a numeric input: zero shows as an empty field.
pub fn input_display(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        format_number(value)
    }
}

/// Shortest form that reads back as the same number ("100", "0.1", "12.75").
/// Magnitudes from 1e21 up or below 1e-6 use exponent form ("1e-300", "2.5e+21").
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude.is_finite() && (magnitude >= 1e21 || magnitude < 1e-6) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", value)
}
