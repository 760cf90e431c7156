//! # Document
//!
//! The `(template, tokens)` pair the document store hands to the engine.
//! Persistence itself belongs to the host; these helpers only cover the
//! JSON interchange so tools and tests can load and save documents.

use crate::element::Element;
use crate::error::ModelResult;
use crate::tokens::DesignTokens;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub template: Element,
    #[serde(default)]
    pub tokens: DesignTokens,
}

impl Document {
    pub fn new(template: Element, tokens: DesignTokens) -> Self {
        Self { template, tokens }
    }

    pub fn from_json_str(source: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json_string(&self, pretty: bool) -> ModelResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn save(&self, path: &Path) -> ModelResult<()> {
        std::fs::write(path, self.to_json_string(true)?)?;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Element::frame(Vec::new()), DesignTokens::default())
    }
}
