use super::{emit, read_json};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use vellum_evaluator::{RenderDiagnostic, RenderedNode, Renderer};
use vellum_model::{Document, View};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Document JSON (`{ template, tokens }`)
    pub document: PathBuf,

    /// View data JSON
    pub view: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub rendered: Option<RenderedNode>,
    pub diagnostics: Vec<RenderDiagnostic>,
}

pub fn render(args: RenderArgs, config: &Config) -> Result<()> {
    let document: Document = read_json(&args.document)?;
    let view: View = read_json(&args.view)?;

    let report = render_document(&document, &view, config);

    for diagnostic in &report.diagnostics {
        eprintln!("  {} {}", "warning".yellow().bold(), diagnostic);
    }
    if report.rendered.is_none() {
        eprintln!("  {} Root element is hidden; nothing rendered", "⚠️".yellow());
    }

    emit(&config.to_json(&report)?, args.output.as_deref())
}

pub fn render_document(document: &Document, view: &View, config: &Config) -> RenderReport {
    let options = config.render_options();
    let mut renderer = Renderer::with_options(view, &document.tokens, &options);
    let rendered = renderer.render(&document.template);
    RenderReport {
        rendered,
        diagnostics: renderer.take_diagnostics(),
    }
}
