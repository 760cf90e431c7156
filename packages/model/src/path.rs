//! Positional addresses of elements within a tree
//!
//! Textual form: `.`-joined segments where `children[N]` selects the Nth
//! child (0-based) and a bare `children` segment is a separator that is
//! skipped. The empty string addresses the root.
//!
//! ```text
//! ""                          → root
//! "children[1]"               → second child of the root
//! "children[1].children[0]"   → first child of that
//! "children.children[2]"      → same as "children[2]"
//! ```

use crate::element::Element;
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const CHILDREN: &str = "children";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementPath {
    indices: Vec<usize>,
}

impl ElementPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn parse(raw: &str) -> ModelResult<Self> {
        let mut indices = Vec::new();
        if raw.is_empty() {
            return Ok(Self { indices });
        }

        for segment in raw.split('.') {
            if segment == CHILDREN {
                continue;
            }

            let index = segment
                .strip_prefix(CHILDREN)
                .and_then(|rest| rest.strip_prefix('['))
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or_else(|| {
                    ModelError::invalid_path(raw, format!("unexpected segment '{}'", segment))
                })?;

            let index = index.parse::<usize>().map_err(|_| {
                ModelError::invalid_path(raw, format!("'{}' is not a child index", index))
            })?;
            indices.push(index);
        }

        Ok(Self { indices })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Parent path and the index of this element within it
    pub fn split_last(&self) -> Option<(ElementPath, usize)> {
        let (last, parent) = self.indices.split_last()?;
        Some((
            ElementPath {
                indices: parent.to_vec(),
            },
            *last,
        ))
    }

    pub fn child(&self, index: usize) -> ElementPath {
        let mut indices = self.indices.clone();
        indices.push(index);
        ElementPath { indices }
    }

    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.indices.pop()
    }

    /// True when `self` is `other` or lies inside it
    pub fn starts_with(&self, other: &ElementPath) -> bool {
        self.indices.starts_with(&other.indices)
    }

    /// Follow this path through an owned tree
    pub fn find<'a>(&self, root: &'a Element) -> Option<&'a Element> {
        self.indices
            .iter()
            .try_fold(root, |node, &index| node.children()?.get(index))
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}[{}]", CHILDREN, index)?;
        }
        Ok(())
    }
}

impl FromStr for ElementPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ElementPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElementPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ElementPath::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_is_root() {
        let path = ElementPath::parse("").unwrap();
        assert!(path.is_root());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_parse_nested_indices() {
        let path = ElementPath::parse("children[1].children[0]").unwrap();
        assert_eq!(path.indices(), &[1, 0]);
        assert_eq!(path.to_string(), "children[1].children[0]");
    }

    #[test]
    fn test_bare_children_segment_is_skipped() {
        let path = ElementPath::parse("children.children[2]").unwrap();
        assert_eq!(path.indices(), &[2]);
    }

    #[test]
    fn test_malformed_segments_rejected() {
        assert!(ElementPath::parse("items[0]").is_err());
        assert!(ElementPath::parse("children[x]").is_err());
        assert!(ElementPath::parse("children[1").is_err());
        assert!(ElementPath::parse("children[-1]").is_err());
        assert!(ElementPath::parse(".").is_err());
    }

    #[test]
    fn test_split_last() {
        let path = ElementPath::parse("children[3].children[4]").unwrap();
        let (parent, index) = path.split_last().unwrap();
        assert_eq!(parent.indices(), &[3]);
        assert_eq!(index, 4);
        assert!(ElementPath::root().split_last().is_none());
    }

    #[test]
    fn test_find_in_tree() {
        let tree = Element::frame(vec![
            Element::text("a"),
            Element::frame(vec![Element::text("b")]),
        ]);

        let found = ElementPath::parse("children[1].children[0]")
            .unwrap()
            .find(&tree);
        assert_eq!(found, Some(&Element::text("b")));
        assert!(ElementPath::parse("children[5]").unwrap().find(&tree).is_none());
        assert!(ElementPath::parse("children[0].children[0]")
            .unwrap()
            .find(&tree)
            .is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let path = ElementPath::from_indices(vec![0, 2]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"children[0].children[2]\"");
        let back: ElementPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
