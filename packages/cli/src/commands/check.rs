use super::read_json;
use crate::config::Config;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use vellum_evaluator::{ValidationLevel, ValidationWarning, Validator};
use vellum_model::Document;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document JSON to validate
    pub document: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn check(args: CheckArgs, config: &Config) -> Result<()> {
    let document: Document = read_json(&args.document)?;
    let warnings = Validator::new().validate(&document.template);
    let errors = count(&warnings, ValidationLevel::Error);

    if args.format == "json" {
        println!("{}", config.to_json(&warnings)?);
    } else {
        print_text(&args.document, &warnings);
    }

    if errors > 0 {
        bail!("{} found {} error(s)", args.document.display(), errors);
    }
    Ok(())
}

fn print_text(file: &std::path::Path, warnings: &[ValidationWarning]) {
    println!("🔍 {} {}", "Checking".green().bold(), file.display());

    for warning in warnings {
        let level = match warning.level {
            ValidationLevel::Error => "error".red().bold(),
            ValidationLevel::Warning => "warning".yellow().bold(),
        };
        let at = if warning.path.is_root() {
            "<root>".to_string()
        } else {
            warning.path.to_string()
        };
        println!("  {} [{}] {}", level, at.dimmed(), warning.message);
    }

    let errors = count(warnings, ValidationLevel::Error);
    let other = warnings.len() - errors;
    if warnings.is_empty() {
        println!("  {} No issues found!", "✓".green());
    } else {
        println!();
        if errors > 0 {
            println!("  {} {}", "Errors:".red(), errors);
        }
        if other > 0 {
            println!("  {} {}", "Warnings:".yellow(), other);
        }
    }
}

fn count(warnings: &[ValidationWarning], level: ValidationLevel) -> usize {
    warnings.iter().filter(|w| w.level == level).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_document(dir: &tempfile::TempDir, template: serde_json::Value) -> PathBuf {
        let path = dir.path().join("doc.json");
        std::fs::write(&path, json!({ "template": template }).to_string()).unwrap();
        path
    }

    fn args(document: PathBuf) -> CheckArgs {
        CheckArgs {
            document,
            format: "text".to_string(),
        }
    }

    #[test]
    fn test_warnings_alone_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_document(
            &dir,
            json!({
                "type": "Frame",
                "children": [{ "type": "Text", "condition": { "expression": "a && b" } }]
            }),
        );
        assert!(check(args(path), &Config::default()).is_ok());
    }

    #[test]
    fn test_errors_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_document(
            &dir,
            json!({ "type": "Frame", "children": [{ "type": "Chart" }] }),
        );
        let err = check(args(path), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("1 error"));
    }

    #[test]
    fn test_unreadable_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(check(args(path), &Config::default()).is_err());
    }
}
