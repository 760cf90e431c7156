//! # Data Paths
//!
//! Binding paths are parsed once into a sequence of steps and replayed
//! against view data, instead of re-splitting strings at every lookup.
//!
//! ```text
//! client.name        → Field(client) Field(name)
//! items[0].qty       → Field(items) Index(0) Field(qty)
//! items[].qty        → ArrayDeref(items) Field(qty)
//! items.length       → Field(items) Field(length)
//! ```
//!
//! `ArrayDeref` is the marker for "the current repeated item": inside a
//! repeater scope it stands for the scope object itself, outside it is the
//! named array.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Empty path")]
    Empty,

    #[error("Empty segment in path '{0}'")]
    EmptySegment(String),

    #[error("Unterminated bracket in path '{0}'")]
    UnterminatedBracket(String),

    #[error("Invalid index '{index}' in path '{path}'")]
    InvalidIndex { path: String, index: String },

    #[error("Array marker must end its segment in path '{0}'")]
    MisplacedArrayMarker(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Field(String),
    Index(usize),
    ArrayDeref(String),
}

impl PathStep {
    pub fn name(&self) -> Option<&str> {
        match self {
            PathStep::Field(name) | PathStep::ArrayDeref(name) => Some(name),
            PathStep::Index(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPath {
    raw: String,
    steps: Vec<PathStep>,
    qualified: bool,
}

impl DataPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let mut steps = Vec::new();
        let mut segments = 0;
        for segment in raw.split('.') {
            segments += 1;
            parse_segment(raw, segment.trim(), &mut steps)?;
        }

        Ok(Self {
            raw: raw.to_string(),
            steps,
            qualified: segments > 1,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Name of the first segment (`qty` in `qty`, `items` in `items[0]`)
    pub fn head(&self) -> Option<&str> {
        self.steps.first().and_then(PathStep::name)
    }

    /// Whether the path has more than one dot-separated segment
    ///
    /// Only unqualified paths are looked up in a repeater scope.
    pub fn is_qualified(&self) -> bool {
        self.qualified
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DataPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_segment(raw: &str, segment: &str, steps: &mut Vec<PathStep>) -> Result<(), PathError> {
    let (name, mut rest) = match segment.find('[') {
        Some(pos) => segment.split_at(pos),
        None => (segment, ""),
    };

    if name.is_empty() {
        return Err(PathError::EmptySegment(raw.to_string()));
    }

    if rest == "[]" {
        steps.push(PathStep::ArrayDeref(name.to_string()));
        return Ok(());
    }

    steps.push(PathStep::Field(name.to_string()));

    while !rest.is_empty() {
        let close = rest
            .find(']')
            .ok_or_else(|| PathError::UnterminatedBracket(raw.to_string()))?;
        let index = &rest[1..close];
        if index.is_empty() {
            return Err(PathError::MisplacedArrayMarker(raw.to_string()));
        }
        let index = index.trim().parse::<usize>().map_err(|_| PathError::InvalidIndex {
            path: raw.to_string(),
            index: index.to_string(),
        })?;
        steps.push(PathStep::Index(index));

        rest = &rest[close + 1..];
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(PathError::UnterminatedBracket(raw.to_string()));
        }
    }

    Ok(())
}
