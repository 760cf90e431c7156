//! # Edit Session
//!
//! The single mutable entry point for structural editing. Each successful
//! write records one history entry. A write that cannot be applied leaves
//! the session untouched.
//!
//! Two flavours of every write:
//! - [`EditSession::apply`] takes a [`Mutation`] and reports why it failed
//! - the `*_at_path` methods take string paths and return `bool`, for
//!   hosts that only care whether anything happened

use crate::arena::ElementArena;
use crate::errors::EditResult;
use crate::history::{History, DEFAULT_HISTORY_LIMIT};
use crate::mutations::{Mutation, MutationResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use vellum_model::{DesignTokens, Document, Element, ElementPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Maximum number of history entries (0 = unlimited)
    pub history_limit: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Editing session over one document
#[derive(Debug)]
pub struct EditSession {
    history: History,
    /// Bumped on every recorded edit
    version: u64,
}

impl EditSession {
    pub fn new(document: Document) -> Self {
        Self::with_options(document, &EditorOptions::default())
    }

    pub fn with_options(document: Document, options: &EditorOptions) -> Self {
        let mut arena = ElementArena::new();
        let root = arena.insert_tree(document.template);
        debug!(nodes = arena.len(), limit = options.history_limit, "Edit session started");
        Self {
            history: History::new(arena, root, document.tokens, options.history_limit),
            version: 0,
        }
    }

    /// Current element tree, by value
    pub fn template(&self) -> Element {
        self.history.arena().build(self.history.current().root)
    }

    pub fn tokens(&self) -> &DesignTokens {
        &self.history.current().tokens
    }

    /// Current state as a document
    pub fn document(&self) -> Document {
        Document::new(self.template(), self.tokens().clone())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Element at `path` in the current tree (with its sub-tree)
    pub fn element_at_path(&self, path: &str) -> Option<Element> {
        let path = ElementPath::parse(path).ok()?;
        let arena = self.history.arena();
        arena
            .resolve(self.history.current().root, &path)
            .map(|id| arena.build(id))
    }

    /// Apply `mutation` and record it, or leave the session untouched
    #[instrument(skip_all, fields(mutation = mutation.name()))]
    pub fn apply(&mut self, mutation: Mutation) -> EditResult<MutationResult> {
        let current = self.history.current();
        let root = current.root;
        let tokens = match &mutation {
            Mutation::UpdateTokens { tokens } => Arc::new(tokens.clone()),
            _ => Arc::clone(&current.tokens),
        };

        let relinked = mutation.apply_to(self.history.arena_mut(), root)?;
        let path = mutation.result_path(self.history.arena(), relinked.root);

        self.history.record(relinked.root, tokens, mutation.name());
        self.version += 1;

        debug!(
            version = self.version,
            path = %path,
            entries = self.history.len(),
            "Mutation applied"
        );

        Ok(MutationResult {
            version: self.version,
            path,
        })
    }

    /// Merge `patch` into the element at `path`
    pub fn update_element_at_path(&mut self, path: &str, patch: Map<String, Value>) -> bool {
        self.apply_parsed(path, |path| Mutation::UpdateElement { path, patch })
    }

    /// Append `element` to the container at `parent_path`
    pub fn add_element_at_path(&mut self, parent_path: &str, element: Element) -> bool {
        self.apply_parsed(parent_path, |parent_path| Mutation::AddElement {
            parent_path,
            element,
        })
    }

    /// Insert `element` at `index` (clamped) in the container at `parent_path`
    pub fn insert_element_at_path(
        &mut self,
        parent_path: &str,
        index: usize,
        element: Element,
    ) -> bool {
        self.apply_parsed(parent_path, |parent_path| Mutation::InsertElement {
            parent_path,
            index,
            element,
        })
    }

    /// Remove the element at `path`; the root is replaced by an empty frame
    pub fn remove_element_at_path(&mut self, path: &str) -> bool {
        self.apply_parsed(path, |path| Mutation::RemoveElement { path })
    }

    /// Move the element at `from` into `to_parent` at `index`
    pub fn move_element_at_path(&mut self, from: &str, to_parent: &str, index: usize) -> bool {
        let to_parent = match ElementPath::parse(to_parent) {
            Ok(path) => path,
            Err(err) => {
                debug!(error = %err, "Edit skipped");
                return false;
            }
        };
        self.apply_parsed(from, |from| Mutation::MoveElement {
            from,
            to_parent,
            index,
        })
    }

    pub fn update_tokens(&mut self, tokens: DesignTokens) -> bool {
        self.try_apply(Mutation::UpdateTokens { tokens })
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        if moved {
            info!(cursor = self.history.cursor(), entries = self.history.len(), "Undo");
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        if moved {
            info!(cursor = self.history.cursor(), entries = self.history.len(), "Redo");
        }
        moved
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    /// Group following edits into a single undo step named `label`
    pub fn begin_batch(&mut self, label: impl Into<String>) {
        self.history.begin_batch(label);
    }

    pub fn end_batch(&mut self) -> bool {
        self.history.end_batch()
    }

    fn apply_parsed(&mut self, raw: &str, build: impl FnOnce(ElementPath) -> Mutation) -> bool {
        match ElementPath::parse(raw) {
            Ok(path) => self.try_apply(build(path)),
            Err(err) => {
                debug!(path = raw, error = %err, "Edit skipped");
                false
            }
        }
    }

    fn try_apply(&mut self, mutation: Mutation) -> bool {
        let name = mutation.name();
        match self.apply(mutation) {
            Ok(_) => true,
            Err(err) => {
                debug!(mutation = name, error = %err, "Edit skipped");
                false
            }
        }
    }
}
