//! Error types for the editor

use thiserror::Error;
use vellum_model::{ElementPath, ModelError};

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Invalid path: {0}")]
    Path(#[from] ModelError),

    #[error("No element at '{0}'")]
    NotFound(ElementPath),

    #[error("Element at '{0}' cannot have children")]
    NotAContainer(ElementPath),

    #[error("Cannot move '{from}' into its own subtree at '{to}'")]
    CycleDetected { from: ElementPath, to: ElementPath },

    #[error("The root element cannot be moved")]
    CannotMoveRoot,

    #[error("Patch may not change '{0}'")]
    ProtectedField(String),

    #[error("Patch for '{path}' is invalid: {source}")]
    InvalidPatch {
        path: ElementPath,
        #[source]
        source: serde_json::Error,
    },
}

pub type EditResult<T> = Result<T, EditError>;
