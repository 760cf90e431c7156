use serde::{Deserialize, Serialize};

/// Declarative reference from an element field to a path in the view
///
/// `path` is dotted/bracketed (`client.name`, `items[0].qty`, `items[]`),
/// `formatter` is a pipe-separated pipeline head plus arguments
/// (`round|2`, `date|DD/MM/YYYY`), `fallback` replaces anything that
/// fails to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBinding {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl DataBinding {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            formatter: None,
            fallback: None,
        }
    }

    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Fallback text, or empty when none is configured
    pub fn fallback_or_empty(&self) -> String {
        self.fallback.clone().unwrap_or_default()
    }
}

/// Conditional visibility of an element and its whole sub-tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub expression: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub invert: bool,
}

impl Condition {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            invert: false,
        }
    }

    pub fn inverted(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            invert: true,
        }
    }
}
