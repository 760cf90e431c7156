use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vellum_editor::{EditorOptions, DEFAULT_HISTORY_LIMIT};
use vellum_evaluator::{RenderOptions, DEFAULT_DATE_FORMAT};

pub const DEFAULT_CONFIG_NAME: &str = "vellum.config.json";

/// Vellum configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Maximum undo entries kept while applying mutations (0 = unlimited)
    pub history_limit: usize,

    /// Pattern used by the `date` formatter when none is given
    pub date_format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Config {
    /// Load config from `explicit`, or from the default file in `cwd`
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_NAME);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Cannot read config {}", config_path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "Loaded config");
        Ok(config)
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            history_limit: self.history_limit,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            date_format: self.date_format.clone(),
            ..RenderOptions::default()
        }
    }

    /// Serialise `value` honouring `pretty`
    pub fn to_json<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            pretty: true,
        }
    }
}
