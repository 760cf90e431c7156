//! # Vellum Evaluator
//!
//! Turns an element template plus a view into rendered output.
//!
//! - [`resolver`]: binding paths and formatters
//! - [`condition`]: visibility expressions
//! - [`renderer`]: the recursive tree walk
//! - [`validator`]: static template checks
//!
//! None of the public entry points fail. Misses degrade to fallbacks,
//! hidden elements or skipped nodes, and anything a template author should
//! fix is reported as a diagnostic.

pub mod condition;
pub mod data_path;
pub mod formatters;
pub mod rendered;
pub mod renderer;
pub mod resolver;
pub mod validator;
pub mod value;

#[cfg(test)]
mod tests_conditions;

#[cfg(test)]
mod tests_rendering;

pub use condition::{evaluate, ComparisonOp, ConditionError, ConditionExpr, Literal};
pub use data_path::{DataPath, PathError, PathStep};
pub use formatters::{FormatError, Formatter, DEFAULT_DATE_FORMAT};
pub use rendered::{RenderedNode, TableHeader};
pub use renderer::{render, DiagnosticKind, RenderDiagnostic, RenderOptions, Renderer};
pub use resolver::{resolve, ResolveError, Resolver};
pub use validator::{ValidationLevel, ValidationWarning, Validator};
