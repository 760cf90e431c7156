//! # Vellum Model
//!
//! Pure data for the document engine: the element tree, data bindings,
//! design tokens and the read-only view that templates are rendered against.
//!
//! Nothing in this crate evaluates anything. Binding resolution and
//! rendering live in `vellum-evaluator`, structural editing in
//! `vellum-editor`.

pub mod binding;
pub mod document;
pub mod element;
pub mod error;
pub mod factory;
pub mod path;
pub mod tokens;
pub mod view;
pub mod visitor;

pub use binding::{Condition, DataBinding};
pub use document::Document;
pub use element::{
    Align, Column, ColumnAlign, Direction, Element, ElementTag, Justify, ObjectFit, Style,
    UnknownElement,
};
pub use error::{ModelError, ModelResult};
pub use factory::{create_element_by_name, create_element_by_type};
pub use path::ElementPath;
pub use tokens::DesignTokens;
pub use view::View;
pub use visitor::{walk_element, Visitor};
