pub mod apply;
pub mod check;
pub mod new;
pub mod render;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use new::{new, NewArgs};
pub use render::{render, RenderArgs};

use anyhow::Context;
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Write `json` to `output`, or to stdout when no file was given
pub(crate) fn emit(json: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!("  {} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {}", path.display()))
}
