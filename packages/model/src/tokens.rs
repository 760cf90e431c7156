use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat palette and typography consumed by element presentation
///
/// Tokens carry no resolution logic; the renderer reads a handful of well
/// known keys (`colors.text`, `colors.border`, `colors.primary`,
/// `typography.fontFamily`) as presentation defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignTokens {
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub typography: BTreeMap<String, String>,
}

impl DesignTokens {
    pub fn color(&self, key: &str) -> Option<&String> {
        self.colors.get(key)
    }

    pub fn typography(&self, key: &str) -> Option<&String> {
        self.typography.get(key)
    }

    pub fn with_color(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.colors.insert(key.into(), value.into());
        self
    }

    pub fn with_typography(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.typography.insert(key.into(), value.into());
        self
    }
}
