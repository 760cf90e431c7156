//! # Formatters
//!
//! Post-processing applied to a resolved binding value. A formatter spec is
//! `name|arg1|arg2...`:
//!
//! | spec             | output                                             |
//! |------------------|----------------------------------------------------|
//! | `brl`            | `R$ 1.500,50` (2 decimals, `.` thousands, `,` decimal) |
//! | `date\|FORMAT`   | `DD`, `MM`, `YYYY` substituted; invalid date → `""` |
//! | `upper`/`lower`  | case conversion of the display string              |
//! | `round\|N`       | fixed `N` decimals (default 0)                     |
//! | `percent`        | value × 100, no decimals, `%` suffix               |
//!
//! Unknown names pass the display string through unchanged.

use crate::value::{display_value, to_fixed, to_number};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_DATE_FORMAT: &str = "DD/MM/YYYY";

/// `toFixed` accepts at most this many digits
const MAX_DECIMALS: usize = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Formatter '{formatter}' expects a number, got '{value}'")]
    NotANumber { formatter: String, value: String },

    #[error("Formatter '{formatter}' cannot represent '{value}'")]
    OutOfRange { formatter: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    Brl,
    Date(Option<String>),
    Upper,
    Lower,
    Round(usize),
    Percent,
    Unknown(String),
}

impl Formatter {
    pub fn parse(spec: &str) -> Self {
        let mut parts = spec.split('|');
        let name = parts.next().unwrap_or_default().trim();
        let first_arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

        match name {
            "brl" => Formatter::Brl,
            "date" => Formatter::Date(first_arg.map(str::to_string)),
            "upper" => Formatter::Upper,
            "lower" => Formatter::Lower,
            "round" => Formatter::Round(
                first_arg
                    .and_then(|arg| arg.parse::<usize>().ok())
                    .unwrap_or(0)
                    .min(MAX_DECIMALS),
            ),
            "percent" => Formatter::Percent,
            other => Formatter::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Formatter::Brl => "brl",
            Formatter::Date(_) => "date",
            Formatter::Upper => "upper",
            Formatter::Lower => "lower",
            Formatter::Round(_) => "round",
            Formatter::Percent => "percent",
            Formatter::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Formatter::Unknown(_))
    }

    /// Format `value`; `default_date_format` applies to `date` without an argument
    pub fn apply(&self, value: &Value, default_date_format: &str) -> Result<String, FormatError> {
        match self {
            Formatter::Brl => {
                format_brl(self.number(value)?).ok_or_else(|| self.out_of_range(value))
            }
            Formatter::Date(format) => Ok(parse_date(value)
                .map(|date| format_date(date, format.as_deref().unwrap_or(default_date_format)))
                .unwrap_or_default()),
            Formatter::Upper => Ok(display_value(value).to_uppercase()),
            Formatter::Lower => Ok(display_value(value).to_lowercase()),
            Formatter::Round(decimals) => {
                to_fixed(self.number(value)?, *decimals).ok_or_else(|| self.out_of_range(value))
            }
            Formatter::Percent => to_fixed(self.number(value)? * 100.0, 0)
                .map(|fixed| format!("{}%", fixed))
                .ok_or_else(|| self.out_of_range(value)),
            Formatter::Unknown(_) => Ok(display_value(value)),
        }
    }

    fn number(&self, value: &Value) -> Result<f64, FormatError> {
        to_number(value).ok_or_else(|| FormatError::NotANumber {
            formatter: self.name().to_string(),
            value: display_value(value),
        })
    }

    fn out_of_range(&self, value: &Value) -> FormatError {
        FormatError::OutOfRange {
            formatter: self.name().to_string(),
            value: display_value(value),
        }
    }
}

/// Brazilian real: `R$ 1.234.567,89`, negatives as `-R$ 10,00`
///
/// `None` for amounts too large to print with cents.
pub fn format_brl(amount: f64) -> Option<String> {
    let fixed = to_fixed(amount.abs(), 2)?;
    let (integer, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let negative = amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    Some(format!("{}R$ {},{}", if negative { "-" } else { "" }, grouped, cents))
}

/// Dates arrive as ISO strings (`2024-03-05`, RFC 3339) or epoch milliseconds
fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(raw) => {
            let raw = raw.trim();
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.date_naive())
                .ok()
                .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
                .or_else(|| {
                    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                        .map(|dt| dt.date())
                        .ok()
                })
        }
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn format_date(date: NaiveDate, format: &str) -> String {
    format
        .replace("YYYY", &format!("{:04}", date.year()))
        .replace("MM", &format!("{:02}", date.month()))
        .replace("DD", &format!("{:02}", date.day()))
}
