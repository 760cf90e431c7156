//! Coercions between data values and what templates display or compare
//!
//! Data arrives from the document store as loosely typed JSON, so these
//! follow the forgiving rules templates were authored against: integral
//! numbers print without a fraction, `null` prints as nothing, numeric
//! strings compare as numbers.

use serde_json::Value;

/// Display form of a resolved value
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Shortest display form of a float, without a trailing `.0`
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// Numeric coercion; `None` stands for "not a number"
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [single] => to_number(single),
            _ => None,
        },
        Value::Object(_) => None,
    }
}

/// Parse a numeric string leniently (surrounding whitespace, empty = 0)
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    // `str::parse` also accepts "inf" and "NaN", which are not numbers here
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Truthiness of a possibly-missing value
///
/// Falsy: missing, `null`, `false`, `0`, `NaN` and `""`. Arrays and objects
/// are truthy even when empty.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Round half away from zero to `digits` decimals and print them all
///
/// `None` when `n`, or `n` scaled by `10^digits`, is not finite.
pub fn to_fixed(n: f64, digits: usize) -> Option<String> {
    let digits = digits.min(20);
    let factor = 10f64.powi(digits as i32);
    let scaled = n * factor;
    if !scaled.is_finite() {
        return None;
    }
    let rounded = scaled.round() / factor;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    Some(format!("{:.*}", digits, rounded))
}
