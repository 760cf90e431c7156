//! # Condition Evaluator
//!
//! Visibility conditions are deliberately tiny: either a bare path checked
//! for truthiness, or a single binary comparison between a path and a
//! literal.
//!
//! ```text
//! flags.show                 → truthiness of flags.show
//! items.length > 0           → compare items.length with 0
//! proposal.status == 'sent'  → compare with the string sent
//! ```
//!
//! ## Grammar quirks
//!
//! - An expression without a space is always a bare path.
//! - Operators are searched in the fixed order `>=`, `<=`, `==`, `!=`, `>`,
//!   `<`; the expression is split at the first textual occurrence of the
//!   first operator found. `a == b == c` therefore compares `a` with the
//!   literal `b == c`.
//! - The right-hand side is a literal (number, `true`/`false`, quoted
//!   string); anything else is taken as a literal string, *not* a path.
//! - `&&` and `||` are not supported. Expressions containing them split
//!   wrongly and evaluate to whatever that split yields.
//!
//! Evaluation never fails outward: malformed expressions evaluate to
//! `false`.

use crate::data_path::{DataPath, PathError};
use crate::resolver::lookup;
use crate::value::{display_value, is_truthy, parse_number, to_number};
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, warn};
use vellum_model::View;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Empty condition expression")]
    Empty,

    #[error("No comparison operator in '{0}'")]
    NoOperator(String),

    #[error("Invalid left operand in '{expression}': {source}")]
    InvalidOperand {
        expression: String,
        #[source]
        source: PathError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    NotEqual,
    Greater,
    Less,
}

impl ComparisonOp {
    /// Longer tokens first so `>` never matches inside `>=`
    pub const PRIORITY: [ComparisonOp; 6] = [
        ComparisonOp::GreaterOrEqual,
        ComparisonOp::LessOrEqual,
        ComparisonOp::Equal,
        ComparisonOp::NotEqual,
        ComparisonOp::Greater,
        ComparisonOp::Less,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            ComparisonOp::GreaterOrEqual => ">=",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::Equal => "==",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::Greater => ">",
            ComparisonOp::Less => "<",
        }
    }
}

/// Right-hand operand of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Bool(bool),
    String(String),
}

impl Literal {
    pub fn parse(raw: &str) -> Self {
        if let Some(n) = parse_number(raw) {
            return Literal::Number(n);
        }
        match raw {
            "true" => return Literal::Bool(true),
            "false" => return Literal::Bool(false),
            _ => {}
        }
        let unquoted = ['\'', '"'].iter().find_map(|&quote| {
            raw.strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        });
        Literal::String(unquoted.unwrap_or(raw).to_string())
    }
}

/// Parsed condition expression
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpr {
    Exists(DataPath),
    Compare {
        left: DataPath,
        op: ComparisonOp,
        right: Literal,
    },
}

impl ConditionExpr {
    pub fn parse(expression: &str) -> Result<Self, ConditionError> {
        let invalid = |source| ConditionError::InvalidOperand {
            expression: expression.to_string(),
            source,
        };

        if expression.trim().is_empty() {
            return Err(ConditionError::Empty);
        }

        if !expression.contains(' ') {
            return DataPath::parse(expression)
                .map(ConditionExpr::Exists)
                .map_err(invalid);
        }

        let (op, position) = ComparisonOp::PRIORITY
            .iter()
            .find_map(|op| expression.find(op.token()).map(|pos| (*op, pos)))
            .ok_or_else(|| ConditionError::NoOperator(expression.to_string()))?;

        let left = expression[..position].trim();
        let right = expression[position + op.token().len()..].trim();

        Ok(ConditionExpr::Compare {
            left: DataPath::parse(left).map_err(invalid)?,
            op,
            right: Literal::parse(right),
        })
    }

    pub fn evaluate(&self, view: &View, scope: Option<&Value>) -> bool {
        match self {
            ConditionExpr::Exists(path) => is_truthy(lookup(path, view, scope).as_deref()),
            ConditionExpr::Compare { left, op, right } => {
                let left = lookup(left, view, scope);
                compare(left.as_deref(), *op, right)
            }
        }
    }
}

/// Evaluate a visibility expression; malformed expressions are `false`
pub fn evaluate(expression: &str, view: &View, scope: Option<&Value>) -> bool {
    match ConditionExpr::parse(expression) {
        Ok(expr) => expr.evaluate(view, scope),
        Err(err) => {
            warn!(expression, error = %err, "Malformed condition, treating as false");
            false
        }
    }
}

fn compare(left: Option<&Value>, op: ComparisonOp, right: &Literal) -> bool {
    let result = match op {
        ComparisonOp::Equal => loose_equals(left, right),
        ComparisonOp::NotEqual => !loose_equals(left, right),
        ComparisonOp::Greater => relational(left, right) == Some(Ordering::Greater),
        ComparisonOp::Less => relational(left, right) == Some(Ordering::Less),
        ComparisonOp::GreaterOrEqual => matches!(
            relational(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ComparisonOp::LessOrEqual => matches!(
            relational(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
    };
    debug!(?left, op = op.token(), ?right, result, "Compared condition operands");
    result
}

/// Loose equality: numbers and numeric strings compare numerically,
/// booleans compare as 0/1, a missing left side equals nothing
fn loose_equals(left: Option<&Value>, right: &Literal) -> bool {
    let Some(left) = left.filter(|v| !v.is_null()) else {
        return false;
    };

    match (left, right) {
        (Value::String(l), Literal::String(r)) => l == r,
        (Value::Array(_) | Value::Object(_), Literal::String(r)) => display_value(left) == *r,
        (_, Literal::String(r)) => match (to_number(left), parse_number(r)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
        (_, Literal::Bool(r)) => to_number(left) == Some(if *r { 1.0 } else { 0.0 }),
        (_, Literal::Number(r)) => to_number(left) == Some(*r),
    }
}

/// Ordering for `<`/`>`: strings lexicographically, everything else as numbers
fn relational(left: Option<&Value>, right: &Literal) -> Option<Ordering> {
    let left = left.filter(|v| !v.is_null())?;

    match (left, right) {
        (Value::String(l), Literal::String(r)) => Some(l.as_str().cmp(r.as_str())),
        _ => {
            let l = to_number(left)?;
            let r = match right {
                Literal::Number(n) => *n,
                Literal::Bool(b) => f64::from(u8::from(*b)),
                Literal::String(s) => parse_number(s)?,
            };
            l.partial_cmp(&r)
        }
    }
}
