//! # Element Arena
//!
//! Immutable element nodes shared between history snapshots.
//!
//! A node stores its element's own fields (children detached) plus the ids
//! of its children. Nodes are never modified after insertion: an edit
//! allocates a replacement for the target and for each of its ancestors,
//! and every sibling sub-tree is shared by id.
//!
//! ```text
//! before:   R ─┬─ A ─── C          after editing C:   R' ─┬─ A' ─── C'
//!              └─ B                                       └─ B   (shared)
//! ```
//!
//! Children are always allocated before the parent that links them, so a
//! child's id is lower than its parent's.

use std::collections::HashSet;
use vellum_model::{Element, ElementPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    /// Element fields with `children` left empty
    props: Element,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ElementArena {
    nodes: Vec<Node>,
}

impl ElementArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate an owned tree, returning the id of its root
    pub fn insert_tree(&mut self, mut element: Element) -> NodeId {
        let children = element
            .take_children()
            .into_iter()
            .map(|child| self.insert_tree(child))
            .collect();
        self.alloc(element, children)
    }

    /// Allocate a node from detached props and existing children
    pub fn alloc(&mut self, mut props: Element, children: Vec<NodeId>) -> NodeId {
        props.take_children();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { props, children });
        id
    }

    /// Element fields of `id`, without children
    pub fn props(&self, id: NodeId) -> &Element {
        &self.nodes[id.0].props
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Rebuild the owned tree rooted at `id`
    pub fn build(&self, id: NodeId) -> Element {
        let node = &self.nodes[id.0];
        let mut element = node.props.clone();
        if let Some(children) = element.children_mut() {
            children.extend(node.children.iter().map(|&child| self.build(child)));
        }
        element
    }

    /// Number of elements reachable from `id`, including itself
    pub fn subtree_len(&self, id: NodeId) -> usize {
        1 + self
            .children(id)
            .iter()
            .map(|&child| self.subtree_len(child))
            .sum::<usize>()
    }

    /// Node ids from `root` down to the node at `path`, inclusive
    pub fn ancestry(&self, root: NodeId, path: &ElementPath) -> Option<Vec<NodeId>> {
        let mut chain = Vec::with_capacity(path.depth() + 1);
        chain.push(root);
        let mut current = root;
        for &index in path.indices() {
            current = *self.children(current).get(index)?;
            chain.push(current);
        }
        Some(chain)
    }

    pub fn resolve(&self, root: NodeId, path: &ElementPath) -> Option<NodeId> {
        path.indices()
            .iter()
            .try_fold(root, |node, &index| self.children(node).get(index).copied())
    }

    /// Copy-on-write: produce a new root in which the node at `path` is
    /// `replacement`. Only the ancestors of `path` are reallocated.
    pub fn relink(
        &mut self,
        root: NodeId,
        path: &ElementPath,
        replacement: NodeId,
    ) -> Option<NodeId> {
        let chain = self.ancestry(root, path)?;
        let mut new_child = replacement;
        for (depth, &index) in path.indices().iter().enumerate().rev() {
            let ancestor = chain[depth];
            let mut children = self.children(ancestor).to_vec();
            children[index] = new_child;
            new_child = self.alloc(self.props(ancestor).clone(), children);
        }
        Some(new_child)
    }

    /// Forget every node allocated after the arena held `len` nodes
    ///
    /// Used to roll back a failed edit. Only valid while nothing older than
    /// `len` links to the discarded nodes.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Drop every node unreachable from `roots`, rewriting `roots` in place
    ///
    /// Returns the number of nodes reclaimed.
    pub fn compact(&mut self, roots: &mut [NodeId]) -> usize {
        let mut live = HashSet::new();
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if live.insert(id) {
                stack.extend_from_slice(self.children(id));
            }
        }

        let before = self.nodes.len();
        let mut remap = vec![None; before];
        let mut nodes = Vec::with_capacity(live.len());
        for (old, node) in std::mem::take(&mut self.nodes).into_iter().enumerate() {
            if !live.contains(&NodeId(old)) {
                continue;
            }
            remap[old] = Some(NodeId(nodes.len()));
            nodes.push(node);
        }

        // Children precede parents, so every live child is already remapped
        for node in &mut nodes {
            for child in &mut node.children {
                if let Some(new_id) = remap[child.0] {
                    *child = new_id;
                }
            }
        }
        for root in roots.iter_mut() {
            if let Some(new_id) = remap[root.0] {
                *root = new_id;
            }
        }

        self.nodes = nodes;
        before - self.nodes.len()
    }
}
