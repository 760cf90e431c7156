//! # Vellum Editor
//!
//! Path-addressed structural editing with undo/redo.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Element tree + tokens (Document)     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession + History               │
//! │  - Mutations addressed by element path      │
//! │  - Copy-on-write snapshots in an arena      │
//! │  - Bounded undo/redo, batches, labels       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ evaluator: Element tree + View → rendered   │
//! │  (Pipeline re-renders after every change)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vellum_editor::EditSession;
//! use vellum_model::{Document, Element};
//!
//! let mut session = EditSession::new(Document::default());
//! session.add_element_at_path("", Element::text("Hello"));
//! session.undo();
//! assert!(session.can_redo());
//! ```

mod arena;
mod errors;
mod history;
mod mutations;
mod pipeline;
mod session;

pub use arena::{ElementArena, NodeId};
pub use errors::{EditError, EditResult};
pub use history::{History, HistoryEntry, DEFAULT_HISTORY_LIMIT};
pub use mutations::{Mutation, MutationResult};
pub use pipeline::{Pipeline, PipelineResult};
pub use session::{EditSession, EditorOptions};
