//! # Undo/Redo History
//!
//! Whole-document snapshots plus a cursor.
//!
//! ## Design
//!
//! - Each entry is `(root, tokens, label)`; trees live in a shared
//!   [`ElementArena`], so a snapshot costs one root id
//! - A new edit after undo truncates everything past the cursor
//! - Undo/redo only move the cursor
//! - Batches: the first edit in a batch appends, later edits replace that
//!   entry, so the batch undoes as one step
//! - Entries beyond the limit are evicted oldest-first
//! - Arena nodes no entry can reach are reclaimed once enough garbage
//!   accumulates

use crate::arena::{ElementArena, NodeId};
use std::sync::Arc;
use tracing::debug;
use vellum_model::DesignTokens;

/// Default maximum number of history entries
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Arena size below which compaction is never attempted
const MIN_COMPACT_THRESHOLD: usize = 1024;

/// Immutable document snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub root: NodeId,
    pub tokens: Arc<DesignTokens>,
    pub label: String,
}

#[derive(Debug, Clone)]
struct Batch {
    label: String,
    /// Set once the batch has produced its entry
    recorded: bool,
}

#[derive(Debug)]
pub struct History {
    arena: ElementArena,
    entries: Vec<HistoryEntry>,
    cursor: usize,
    /// Maximum number of entries (0 = unlimited)
    limit: usize,
    batch: Option<Batch>,
    compact_at: usize,
}

impl History {
    /// Start a history whose single entry is the initial document
    pub fn new(arena: ElementArena, root: NodeId, tokens: DesignTokens, limit: usize) -> Self {
        Self {
            compact_at: (arena.len() * 2).max(MIN_COMPACT_THRESHOLD),
            arena,
            entries: vec![HistoryEntry {
                root,
                tokens: Arc::new(tokens),
                label: "Initial document".to_string(),
            }],
            cursor: 0,
            limit,
            batch: None,
        }
    }

    pub fn arena(&self) -> &ElementArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut ElementArena {
        &mut self.arena
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record a new snapshot after the cursor
    pub fn record(&mut self, root: NodeId, tokens: Arc<DesignTokens>, label: &str) {
        let at_tail = self.cursor + 1 == self.entries.len();
        let mut dropped = false;

        let label = match &self.batch {
            Some(batch) => batch.label.clone(),
            None => label.to_string(),
        };
        let entry = HistoryEntry {
            root,
            tokens,
            label,
        };

        match &mut self.batch {
            Some(batch) if batch.recorded && at_tail => {
                self.entries[self.cursor] = entry;
                dropped = true;
            }
            batch => {
                if !at_tail {
                    self.entries.truncate(self.cursor + 1);
                    dropped = true;
                }
                self.entries.push(entry);
                self.cursor = self.entries.len() - 1;
                if let Some(batch) = batch {
                    batch.recorded = true;
                }
            }
        }

        if self.limit > 0 && self.entries.len() > self.limit {
            let evicted = self.entries.len() - self.limit;
            self.entries.drain(..evicted);
            self.cursor -= evicted;
            dropped = true;
            debug!(evicted, limit = self.limit, "Evicted oldest history entries");
        }

        if dropped {
            self.maybe_compact();
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back; `false` when already at the oldest entry
    pub fn undo(&mut self) -> bool {
        self.close_batch();
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step forward; `false` when already at the newest entry
    pub fn redo(&mut self) -> bool {
        self.close_batch();
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Label of the step `undo` would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.cursor].label.as_str())
    }

    /// Label of the step `redo` would reapply
    pub fn redo_label(&self) -> Option<&str> {
        self.can_redo()
            .then(|| self.entries[self.cursor + 1].label.as_str())
    }

    pub fn begin_batch(&mut self, label: impl Into<String>) {
        self.batch = Some(Batch {
            label: label.into(),
            recorded: false,
        });
    }

    /// Close the open batch; returns whether it recorded anything
    pub fn end_batch(&mut self) -> bool {
        self.batch.take().is_some_and(|batch| batch.recorded)
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    fn close_batch(&mut self) {
        if let Some(batch) = self.batch.take() {
            debug!(label = %batch.label, "Batch closed by undo/redo");
        }
    }

    fn maybe_compact(&mut self) {
        if self.arena.len() < self.compact_at {
            return;
        }
        let reclaimed = self.compact();
        self.compact_at = (self.arena.len() * 2).max(MIN_COMPACT_THRESHOLD);
        debug!(
            reclaimed,
            live = self.arena.len(),
            next = self.compact_at,
            "Compacted element arena"
        );
    }

    /// Reclaim unreachable nodes now, regardless of the threshold
    pub fn compact(&mut self) -> usize {
        let mut roots: Vec<NodeId> = self.entries.iter().map(|entry| entry.root).collect();
        let reclaimed = self.arena.compact(&mut roots);
        for (entry, root) in self.entries.iter_mut().zip(roots) {
            entry.root = root;
        }
        reclaimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_model::Element;

    fn history(limit: usize) -> History {
        let mut arena = ElementArena::new();
        let root = arena.insert_tree(Element::frame(vec![]));
        History::new(arena, root, DesignTokens::default(), limit)
    }

    fn record_text(history: &mut History, content: &str) {
        let tokens = Arc::clone(&history.current().tokens);
        let root = history.arena_mut().insert_tree(Element::text(content));
        history.record(root, tokens, "Edit");
    }

    fn current_text(history: &History) -> Element {
        history.arena().build(history.current().root)
    }

    #[test]
    fn test_starts_with_initial_entry() {
        let history = history(0);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_label(), None);
    }

    #[test]
    fn test_undo_redo_move_cursor() {
        let mut history = history(0);
        record_text(&mut history, "one");
        record_text(&mut history, "two");

        assert!(history.undo());
        assert_eq!(current_text(&history), Element::text("one"));
        assert!(history.redo());
        assert_eq!(current_text(&history), Element::text("two"));
        assert!(!history.redo());
    }

    #[test]
    fn test_new_edit_truncates_redo_branch() {
        let mut history = history(0);
        record_text(&mut history, "one");
        record_text(&mut history, "two");
        history.undo();
        record_text(&mut history, "three");

        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        history.undo();
        assert_eq!(current_text(&history), Element::text("one"));
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = history(3);
        for i in 0..5 {
            record_text(&mut history, &i.to_string());
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        history.undo();
        history.undo();
        assert!(!history.can_undo());
        assert_eq!(current_text(&history), Element::text("2"));
    }

    #[test]
    fn test_batch_collapses_to_one_entry() {
        let mut history = history(0);
        history.begin_batch("Restyle header");
        record_text(&mut history, "a");
        record_text(&mut history, "b");
        record_text(&mut history, "c");
        assert!(history.end_batch());

        assert_eq!(history.len(), 2);
        assert_eq!(history.undo_label(), Some("Restyle header"));
        history.undo();
        assert_eq!(current_text(&history), Element::frame(vec![]));
        assert_eq!(history.redo_label(), Some("Restyle header"));
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut history = history(0);
        history.begin_batch("Nothing");
        assert!(!history.end_batch());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_compact_keeps_entries_intact() {
        let mut history = history(2);
        for i in 0..4 {
            record_text(&mut history, &i.to_string());
        }
        let reclaimed = history.compact();
        assert!(reclaimed >= 1);
        assert_eq!(history.arena().len(), 2);
        assert_eq!(current_text(&history), Element::text("3"));
        history.undo();
        assert_eq!(current_text(&history), Element::text("2"));
    }
}
