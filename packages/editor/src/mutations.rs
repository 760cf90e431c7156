//! # Structural Mutations
//!
//! Path-addressed operations on the element tree.
//!
//! ## Mutation Semantics
//!
//! ### UpdateElement
//! - `patch` is a JSON object merged over the element's own fields
//! - `type` and `children` may not be patched
//! - `null` clears an optional field; fields the tag does not define are dropped
//!
//! ### AddElement / InsertElement
//! - Parent must be a container (`Frame`, `Stack`, `Grid`, `Repeater`)
//! - Insert index is clamped to the end of the child list
//!
//! ### RemoveElement
//! - Removes the element and its sub-tree
//! - Removing the root leaves an empty `Frame` in its place
//!
//! ### MoveElement
//! - Both paths are read against the tree *before* the move
//! - Fails if the target parent lies inside the moved element (cycle)
//! - Index is a position among the target's current children, clamped
//!
//! ### UpdateTokens
//! - Replaces the design tokens; the tree is shared unchanged

use crate::arena::{ElementArena, NodeId};
use crate::errors::{EditError, EditResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vellum_model::{DesignTokens, Element, ElementPath};

/// Serialisable editor operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Merge fields into the element at `path`
    UpdateElement {
        path: ElementPath,
        patch: Map<String, Value>,
    },

    /// Append to a container's children
    AddElement {
        #[serde(rename = "parentPath")]
        parent_path: ElementPath,
        element: Element,
    },

    /// Insert into a container's children at `index`
    InsertElement {
        #[serde(rename = "parentPath")]
        parent_path: ElementPath,
        index: usize,
        element: Element,
    },

    /// Remove an element and its sub-tree
    RemoveElement { path: ElementPath },

    /// Relocate an element to a new parent at `index`
    MoveElement {
        from: ElementPath,
        #[serde(rename = "toParent")]
        to_parent: ElementPath,
        index: usize,
    },

    /// Replace the design tokens
    UpdateTokens { tokens: DesignTokens },
}

/// Outcome of an applied mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResult {
    /// Session revision after the edit
    pub version: u64,

    /// Where the affected element now lives (the removed position for
    /// removals, the root for token updates)
    pub path: ElementPath,
}

/// New tree produced by a structural mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Relinked {
    pub root: NodeId,
}

impl Mutation {
    /// History label for this operation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::UpdateElement { .. } => "Update element",
            Mutation::AddElement { .. } => "Add element",
            Mutation::InsertElement { .. } => "Insert element",
            Mutation::RemoveElement { .. } => "Remove element",
            Mutation::MoveElement { .. } => "Move element",
            Mutation::UpdateTokens { .. } => "Update tokens",
        }
    }

    /// Path of the affected element once this mutation is applied to `arena`
    pub(crate) fn result_path(&self, arena: &ElementArena, root: NodeId) -> ElementPath {
        match self {
            Mutation::UpdateElement { path, .. } | Mutation::RemoveElement { path } => path.clone(),
            Mutation::AddElement { parent_path, .. } => {
                let len = arena
                    .resolve(root, parent_path)
                    .map_or(0, |parent| arena.children(parent).len());
                parent_path.child(len.saturating_sub(1))
            }
            Mutation::InsertElement {
                parent_path, index, ..
            } => {
                let len = arena
                    .resolve(root, parent_path)
                    .map_or(0, |parent| arena.children(parent).len());
                parent_path.child((*index).min(len.saturating_sub(1)))
            }
            Mutation::MoveElement {
                from,
                to_parent,
                index,
            } => {
                let (to_parent, index) = adjust_move_target(from, to_parent, *index);
                let len = arena
                    .resolve(root, &to_parent)
                    .map_or(0, |parent| arena.children(parent).len());
                to_parent.child(index.min(len.saturating_sub(1)))
            }
            Mutation::UpdateTokens { .. } => ElementPath::root(),
        }
    }

    /// Apply a structural mutation to the tree at `root`
    ///
    /// Token updates do not touch the tree and return `root` unchanged.
    /// A failed mutation leaves the arena exactly as it found it.
    pub(crate) fn apply_to(&self, arena: &mut ElementArena, root: NodeId) -> EditResult<Relinked> {
        let mark = arena.len();
        self.rewrite(arena, root).map_err(|err| {
            arena.truncate(mark);
            err
        })
    }

    fn rewrite(&self, arena: &mut ElementArena, root: NodeId) -> EditResult<Relinked> {
        let root = match self {
            Mutation::UpdateElement { path, patch } => update(arena, root, path, patch)?,
            Mutation::AddElement {
                parent_path,
                element,
            } => insert(arena, root, parent_path, usize::MAX, element.clone())?,
            Mutation::InsertElement {
                parent_path,
                index,
                element,
            } => insert(arena, root, parent_path, *index, element.clone())?,
            Mutation::RemoveElement { path } => remove(arena, root, path)?,
            Mutation::MoveElement {
                from,
                to_parent,
                index,
            } => move_element(arena, root, from, to_parent, *index)?,
            Mutation::UpdateTokens { .. } => root,
        };
        Ok(Relinked { root })
    }
}

fn update(
    arena: &mut ElementArena,
    root: NodeId,
    path: &ElementPath,
    patch: &Map<String, Value>,
) -> EditResult<NodeId> {
    for field in ["type", "children"] {
        if patch.contains_key(field) {
            return Err(EditError::ProtectedField(field.to_string()));
        }
    }

    let target = arena
        .resolve(root, path)
        .ok_or_else(|| EditError::NotFound(path.clone()))?;
    let props = patch_element(arena.props(target), patch)
        .map_err(|source| EditError::InvalidPatch {
            path: path.clone(),
            source,
        })?;

    let children = arena.children(target).to_vec();
    let replacement = arena.alloc(props, children);
    arena
        .relink(root, path, replacement)
        .ok_or_else(|| EditError::NotFound(path.clone()))
}

/// Merge `patch` over the JSON form of `element` and read it back
fn patch_element(
    element: &Element,
    patch: &Map<String, Value>,
) -> Result<Element, serde_json::Error> {
    let mut fields = match serde_json::to_value(element)? {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    for (key, value) in patch {
        if value.is_null() {
            fields.remove(key);
        } else {
            fields.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(Value::Object(fields))
}

fn insert(
    arena: &mut ElementArena,
    root: NodeId,
    parent_path: &ElementPath,
    index: usize,
    element: Element,
) -> EditResult<NodeId> {
    let parent = arena
        .resolve(root, parent_path)
        .ok_or_else(|| EditError::NotFound(parent_path.clone()))?;
    if !arena.props(parent).is_container() {
        return Err(EditError::NotAContainer(parent_path.clone()));
    }

    let child = arena.insert_tree(element);
    link_child(arena, root, parent_path, index, child)
}

/// Relink `root` with `child` inserted under `parent_path` at `index` (clamped)
fn link_child(
    arena: &mut ElementArena,
    root: NodeId,
    parent_path: &ElementPath,
    index: usize,
    child: NodeId,
) -> EditResult<NodeId> {
    let parent = arena
        .resolve(root, parent_path)
        .ok_or_else(|| EditError::NotFound(parent_path.clone()))?;
    if !arena.props(parent).is_container() {
        return Err(EditError::NotAContainer(parent_path.clone()));
    }

    let mut children = arena.children(parent).to_vec();
    children.insert(index.min(children.len()), child);
    let replacement = arena.alloc(arena.props(parent).clone(), children);
    arena
        .relink(root, parent_path, replacement)
        .ok_or_else(|| EditError::NotFound(parent_path.clone()))
}

fn remove(arena: &mut ElementArena, root: NodeId, path: &ElementPath) -> EditResult<NodeId> {
    let Some((parent_path, index)) = path.split_last() else {
        return Ok(arena.insert_tree(Element::frame(Vec::new())));
    };
    unlink_child(arena, root, &parent_path, index).map(|(root, _)| root)
}

/// Relink `root` without the child at `index` of `parent_path`
fn unlink_child(
    arena: &mut ElementArena,
    root: NodeId,
    parent_path: &ElementPath,
    index: usize,
) -> EditResult<(NodeId, NodeId)> {
    let not_found = || EditError::NotFound(parent_path.child(index));
    let parent = arena.resolve(root, parent_path).ok_or_else(not_found)?;

    let mut children = arena.children(parent).to_vec();
    if index >= children.len() {
        return Err(not_found());
    }
    let removed = children.remove(index);

    let replacement = arena.alloc(arena.props(parent).clone(), children);
    let root = arena
        .relink(root, parent_path, replacement)
        .ok_or_else(not_found)?;
    Ok((root, removed))
}

fn move_element(
    arena: &mut ElementArena,
    root: NodeId,
    from: &ElementPath,
    to_parent: &ElementPath,
    index: usize,
) -> EditResult<NodeId> {
    let Some((from_parent, from_index)) = from.split_last() else {
        return Err(EditError::CannotMoveRoot);
    };
    if to_parent.starts_with(from) {
        return Err(EditError::CycleDetected {
            from: from.clone(),
            to: to_parent.clone(),
        });
    }

    // Validate the target before touching anything
    let target = arena
        .resolve(root, to_parent)
        .ok_or_else(|| EditError::NotFound(to_parent.clone()))?;
    if !arena.props(target).is_container() {
        return Err(EditError::NotAContainer(to_parent.clone()));
    }

    let (detached, moved) = unlink_child(arena, root, &from_parent, from_index)?;
    let (to_parent, index) = adjust_move_target(from, to_parent, index);
    link_child(arena, detached, &to_parent, index, moved)
}

/// Translate a pre-move target into the tree with `from` already removed
fn adjust_move_target(
    from: &ElementPath,
    to_parent: &ElementPath,
    index: usize,
) -> (ElementPath, usize) {
    let Some((from_parent, from_index)) = from.split_last() else {
        return (to_parent.clone(), index);
    };

    if *to_parent == from_parent {
        let index = if index > from_index { index - 1 } else { index };
        return (to_parent.clone(), index);
    }

    let depth = from_parent.depth();
    let mut indices = to_parent.indices().to_vec();
    if to_parent.starts_with(&from_parent) && indices[depth] > from_index {
        indices[depth] -= 1;
    }
    (ElementPath::from_indices(indices), index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vellum_model::{Condition, DataBinding, Direction};

    fn path(raw: &str) -> ElementPath {
        ElementPath::parse(raw).unwrap()
    }

    fn patch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {:?}", other),
        }
    }

    fn apply(tree: Element, mutation: &Mutation) -> EditResult<Element> {
        let mut arena = ElementArena::new();
        let root = arena.insert_tree(tree);
        let relinked = mutation.apply_to(&mut arena, root)?;
        Ok(arena.build(relinked.root))
    }

    fn tree() -> Element {
        Element::frame(vec![
            Element::text("a"),
            Element::stack(Direction::Row, vec![Element::text("b")]),
            Element::text("c"),
        ])
    }

    #[test]
    fn test_update_merges_fields() {
        let result = apply(
            tree(),
            &Mutation::UpdateElement {
                path: path("children[0]"),
                patch: patch(json!({
                    "content": "A",
                    "condition": { "expression": "flags.show" }
                })),
            },
        )
        .unwrap();

        assert_eq!(
            result.children().unwrap()[0],
            Element::text("A").with_condition(Condition::new("flags.show"))
        );
    }

    #[test]
    fn test_update_null_clears_and_unknown_fields_drop() {
        let start = Element::frame(vec![Element::bound_text(
            DataBinding::new("client.name"),
        )]);
        let result = apply(
            start,
            &Mutation::UpdateElement {
                path: path("children[0]"),
                patch: patch(json!({ "binding": null, "content": "x", "cols": 3 })),
            },
        )
        .unwrap();
        assert_eq!(result.children().unwrap()[0], Element::text("x"));
    }

    #[test]
    fn test_update_keeps_children() {
        let result = apply(
            tree(),
            &Mutation::UpdateElement {
                path: path("children[1]"),
                patch: patch(json!({ "direction": "column", "gap": 4 })),
            },
        )
        .unwrap();

        match &result.children().unwrap()[1] {
            Element::Stack {
                direction,
                gap,
                children,
                ..
            } => {
                assert_eq!(*direction, Direction::Column);
                assert_eq!(*gap, Some(4.0));
                assert_eq!(children, &vec![Element::text("b")]);
            }
            other => panic!("Expected stack, got {:?}", other),
        }
    }

    #[test]
    fn test_update_rejects_protected_fields() {
        for field in ["type", "children"] {
            let err = apply(
                tree(),
                &Mutation::UpdateElement {
                    path: path("children[0]"),
                    patch: patch(json!({ field: [] })),
                },
            )
            .unwrap_err();
            assert!(matches!(err, EditError::ProtectedField(f) if f == field));
        }
    }

    #[test]
    fn test_update_rejects_ill_typed_patch() {
        let err = apply(
            Element::grid(2, vec![]),
            &Mutation::UpdateElement {
                path: ElementPath::root(),
                patch: patch(json!({ "cols": "three" })),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditError::InvalidPatch { .. }));
    }

    #[test]
    fn test_insert_clamps_index() {
        let result = apply(
            tree(),
            &Mutation::InsertElement {
                parent_path: path("children[1]"),
                index: 99,
                element: Element::divider(),
            },
        )
        .unwrap();
        assert_eq!(
            result.children().unwrap()[1].children().unwrap(),
            &[Element::text("b"), Element::divider()]
        );
    }

    #[test]
    fn test_insert_into_leaf_fails() {
        let err = apply(
            tree(),
            &Mutation::AddElement {
                parent_path: path("children[0]"),
                element: Element::divider(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditError::NotAContainer(_)));
    }

    #[test]
    fn test_remove_root_leaves_empty_frame() {
        let result = apply(
            tree(),
            &Mutation::RemoveElement {
                path: ElementPath::root(),
            },
        )
        .unwrap();
        assert_eq!(result, Element::frame(vec![]));
    }

    #[test]
    fn test_remove_out_of_range_fails() {
        let err = apply(
            tree(),
            &Mutation::RemoveElement {
                path: path("children[99]"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditError::NotFound(_)));
    }

    #[test]
    fn test_move_forward_within_same_parent() {
        // [a, stack, c]: move a before c (pre-move index 2)
        let result = apply(
            tree(),
            &Mutation::MoveElement {
                from: path("children[0]"),
                to_parent: ElementPath::root(),
                index: 2,
            },
        )
        .unwrap();
        let tags: Vec<_> = result
            .children()
            .unwrap()
            .iter()
            .map(|e| e.tag().unwrap().as_str())
            .collect();
        assert_eq!(tags, vec!["Stack", "Text", "Text"]);
        assert_eq!(result.children().unwrap()[1], Element::text("a"));
    }

    #[test]
    fn test_move_into_later_sibling() {
        // Target path children[1] shifts to children[0] once a is removed
        let result = apply(
            tree(),
            &Mutation::MoveElement {
                from: path("children[0]"),
                to_parent: path("children[1]"),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(
            result,
            Element::frame(vec![
                Element::stack(Direction::Row, vec![Element::text("a"), Element::text("b")]),
                Element::text("c"),
            ])
        );
    }

    #[test]
    fn test_move_out_to_root() {
        let result = apply(
            tree(),
            &Mutation::MoveElement {
                from: path("children[1].children[0]"),
                to_parent: ElementPath::root(),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(result.children().unwrap()[0], Element::text("b"));
        assert_eq!(
            result.children().unwrap()[2].children().map(<[Element]>::len),
            Some(0)
        );
    }

    #[test]
    fn test_move_into_own_subtree_fails() {
        let err = apply(
            tree(),
            &Mutation::MoveElement {
                from: path("children[1]"),
                to_parent: path("children[1]"),
                index: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditError::CycleDetected { .. }));

        let err = apply(
            tree(),
            &Mutation::MoveElement {
                from: ElementPath::root(),
                to_parent: path("children[1]"),
                index: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditError::CannotMoveRoot));
    }

    #[test]
    fn test_mutation_json_shape() {
        let mutation: Mutation = serde_json::from_value(json!({
            "MoveElement": { "from": "children[0]", "toParent": "", "index": 1 }
        }))
        .unwrap();
        assert_eq!(
            mutation,
            Mutation::MoveElement {
                from: path("children[0]"),
                to_parent: ElementPath::root(),
                index: 1,
            }
        );
        assert_eq!(mutation.name(), "Move element");
    }
}
