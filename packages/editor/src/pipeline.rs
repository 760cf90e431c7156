//! # Live Preview Pipeline
//!
//! Coordinates Mutate → Render for an editor with a preview pane.
//!
//! The Pipeline manages:
//! - Applying mutations, undo and redo through one [`EditSession`]
//! - Re-rendering the current tree against a fixed view
//! - Caching the last render and its diagnostics

use crate::errors::EditResult;
use crate::mutations::Mutation;
use crate::session::EditSession;
use tracing::debug;
use vellum_evaluator::{RenderDiagnostic, RenderOptions, RenderedNode, Renderer};
use vellum_model::View;

/// Manages the edit → render loop
pub struct Pipeline {
    session: EditSession,
    view: View,
    options: RenderOptions,
    last_render: Option<PipelineResult>,
}

impl Pipeline {
    pub fn new(session: EditSession, view: View) -> Self {
        Self::with_options(session, view, RenderOptions::default())
    }

    pub fn with_options(session: EditSession, view: View, options: RenderOptions) -> Self {
        Self {
            session,
            view,
            options,
            last_render: None,
        }
    }

    /// Apply a mutation and re-render
    ///
    /// A rejected mutation leaves both the session and the cached render
    /// untouched.
    pub fn apply_mutation(&mut self, mutation: Mutation) -> EditResult<&PipelineResult> {
        self.session.apply(mutation)?;
        Ok(self.full_render())
    }

    /// Undo and re-render; `None` when there was nothing to undo
    pub fn undo(&mut self) -> Option<&PipelineResult> {
        if self.session.undo() {
            Some(self.full_render())
        } else {
            None
        }
    }

    /// Redo and re-render; `None` when there was nothing to redo
    pub fn redo(&mut self) -> Option<&PipelineResult> {
        if self.session.redo() {
            Some(self.full_render())
        } else {
            None
        }
    }

    /// Swap in fresh view data and re-render
    pub fn set_view(&mut self, view: View) -> &PipelineResult {
        self.view = view;
        self.full_render()
    }

    /// Render the current tree from scratch
    ///
    /// Useful for the initial preview and after a view change.
    pub fn full_render(&mut self) -> &PipelineResult {
        let template = self.session.template();
        let mut renderer =
            Renderer::with_options(&self.view, self.session.tokens(), &self.options);
        let rendered = renderer.render(&template);
        let diagnostics = renderer.take_diagnostics();

        debug!(
            version = self.session.version(),
            diagnostics = diagnostics.len(),
            "Preview re-rendered"
        );

        self.last_render.insert(PipelineResult {
            version: self.session.version(),
            rendered,
            diagnostics,
        })
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Last render (if any)
    pub fn last_render(&self) -> Option<&PipelineResult> {
        self.last_render.as_ref()
    }

    /// Drop the cached render
    pub fn clear_cache(&mut self) {
        self.last_render = None;
    }

    pub fn into_session(self) -> EditSession {
        self.session
    }
}

/// Result of a pipeline pass
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Session version the render reflects
    pub version: u64,

    /// `None` when the root itself is hidden
    pub rendered: Option<RenderedNode>,

    pub diagnostics: Vec<RenderDiagnostic>,
}
