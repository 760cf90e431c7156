use super::{emit, read_json};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use vellum_editor::{EditSession, Mutation};
use vellum_model::Document;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Document JSON to edit
    pub document: PathBuf,

    /// JSON array of mutations
    pub mutations: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Group all mutations into one undo step with this label
    #[arg(long)]
    pub batch: Option<String>,
}

pub fn apply(args: ApplyArgs, config: &Config) -> Result<()> {
    let document: Document = read_json(&args.document)?;
    let mutations: Vec<Mutation> = read_json(&args.mutations)?;

    let session = apply_mutations(document, mutations, args.batch, config)?;

    eprintln!(
        "  {} Applied {} mutation(s), {} undo step(s)",
        "✓".green(),
        session.version(),
        session.history().cursor()
    );

    emit(&config.to_json(&session.document())?, args.output.as_deref())
}

/// Replay `mutations` in order, stopping at the first one that fails
pub fn apply_mutations(
    document: Document,
    mutations: Vec<Mutation>,
    batch: Option<String>,
    config: &Config,
) -> Result<EditSession> {
    let mut session = EditSession::with_options(document, &config.editor_options());
    if let Some(label) = batch {
        session.begin_batch(label);
    }

    for (index, mutation) in mutations.into_iter().enumerate() {
        let name = mutation.name();
        session
            .apply(mutation)
            .with_context(|| format!("Mutation #{} ({}) failed", index, name))?;
    }

    session.end_batch();
    Ok(session)
}
