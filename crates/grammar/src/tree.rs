// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Syntax tree
//!
//! A parsed [`Tree`] is an immutable arena. Nodes are stored in preorder, so the
//! arena index of a node is also its position in document order. [`Node`] is a
//! cheap `Copy` handle into the arena; [`TreeCursor`] is a stateful walker that
//! mirrors the tree-sitter cursor API.

use std::fmt;

use crate::kind::NodeKind;

/// Node as produced by the parser, before flattening into the arena
#[derive(Debug, Clone)]
pub(crate) struct RawNode {
    pub kind: NodeKind,
    pub from: usize,
    pub to: usize,
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn leaf(kind: NodeKind, from: usize, to: usize) -> Self {
        Self {
            kind,
            from,
            to,
            children: Vec::new(),
        }
    }

    /// Node whose span runs from its first child to its last child.
    ///
    /// `children` must not be empty.
    pub fn spanning(kind: NodeKind, children: Vec<RawNode>) -> Self {
        let from = children.first().map_or(0, |c| c.from);
        let to = children.last().map_or(from, |c| c.to);
        Self {
            kind,
            from,
            to,
            children,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    from: usize,
    to: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position among the parent's children
    index: usize,
}

/// Immutable LogQL syntax tree
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub(crate) fn from_raw(root: RawNode) -> Self {
        let mut nodes = Vec::new();
        flatten(root, None, 0, &mut nodes);
        Self { nodes }
    }

    /// The root node, always of kind [`NodeKind::LogQL`]
    pub fn root(&self) -> Node<'_> {
        Node { tree: self, id: 0 }
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Innermost node strictly covering `pos` (`from < pos < to`), or the root.
    ///
    /// Zero-width nodes never cover a position.
    pub fn node_at(&self, pos: usize) -> Node<'_> {
        let mut current = self.root();
        'descend: loop {
            for child in current.children() {
                if child.from() < pos && pos < child.to() {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Cursor positioned at [`Tree::node_at`]
    pub fn cursor_at(&self, pos: usize) -> TreeCursor<'_> {
        TreeCursor {
            tree: self,
            id: self.node_at(pos).id,
        }
    }

    /// Cursor positioned at the root
    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor { tree: self, id: 0 }
    }

    /// All nodes in document order
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.nodes.len()).map(move |id| Node { tree: self, id })
    }

    /// Every node whose kind is in `kinds`, in document order
    pub fn nodes_of_kind(&self, kinds: &[NodeKind]) -> Vec<Node<'_>> {
        self.nodes().filter(|n| kinds.contains(&n.kind())).collect()
    }

    /// Whether recovery produced any error node
    pub fn has_error(&self) -> bool {
        self.nodes.iter().any(|n| n.kind.is_error())
    }

    /// Lezer-style dump, e.g. `LogQL(Expr(LogExpr(Selector(⚠))))`
    pub fn to_sexp(&self) -> String {
        self.root().to_sexp()
    }
}

fn flatten(raw: RawNode, parent: Option<usize>, index: usize, nodes: &mut Vec<NodeData>) -> usize {
    let id = nodes.len();
    nodes.push(NodeData {
        kind: raw.kind,
        from: raw.from,
        to: raw.to,
        parent,
        children: Vec::with_capacity(raw.children.len()),
        index,
    });

    for (i, child) in raw.children.into_iter().enumerate() {
        let child_id = flatten(child, Some(id), i, nodes);
        nodes[id].children.push(child_id);
    }
    id
}

/// Handle to a node of a [`Tree`]
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    id: usize,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id]
    }

    fn at(&self, id: usize) -> Node<'t> {
        Node { tree: self.tree, id }
    }

    /// Arena index, equal to the document-order position
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn kind_id(&self) -> u16 {
        self.data().kind.id()
    }

    pub fn from(&self) -> usize {
        self.data().from
    }

    pub fn to(&self) -> usize {
        self.data().to
    }

    pub fn is_error(&self) -> bool {
        self.data().kind.is_error()
    }

    pub fn is_zero_width(&self) -> bool {
        self.from() == self.to()
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| self.at(id))
    }

    pub fn first_child(&self) -> Option<Node<'t>> {
        self.data().children.first().map(|&id| self.at(id))
    }

    pub fn last_child(&self) -> Option<Node<'t>> {
        self.data().children.last().map(|&id| self.at(id))
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let index = self.data().index + 1;
        parent.data().children.get(index).map(|&id| self.at(id))
    }

    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let index = self.data().index.checked_sub(1)?;
        parent.data().children.get(index).map(|&id| self.at(id))
    }

    /// First direct child of the given kind
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn children(self) -> impl Iterator<Item = Node<'t>> {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| Node { tree, id })
    }

    /// Source text covered by this node
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.from()..self.to()).unwrap_or("")
    }

    /// Cursor positioned at this node
    pub fn walk(&self) -> TreeCursor<'t> {
        TreeCursor {
            tree: self.tree,
            id: self.id,
        }
    }

    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push_str(&self.kind().to_string());
        if self.child_count() == 0 {
            return;
        }
        out.push('(');
        for (i, child) in self.children().enumerate() {
            if i > 0 {
                out.push(',');
            }
            child.write_sexp(out);
        }
        out.push(')');
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.kind(), self.from(), self.to())
    }
}

/// Stateful walker over a [`Tree`]
#[derive(Clone)]
pub struct TreeCursor<'t> {
    tree: &'t Tree,
    id: usize,
}

impl<'t> TreeCursor<'t> {
    pub fn node(&self) -> Node<'t> {
        Node {
            tree: self.tree,
            id: self.id,
        }
    }

    fn move_to(&mut self, node: Option<Node<'t>>) -> bool {
        match node {
            Some(node) => {
                self.id = node.id;
                true
            }
            None => false,
        }
    }

    pub fn goto_first_child(&mut self) -> bool {
        let target = self.node().first_child();
        self.move_to(target)
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let target = self.node().next_sibling();
        self.move_to(target)
    }

    pub fn goto_parent(&mut self) -> bool {
        let target = self.node().parent();
        self.move_to(target)
    }

    /// Advance to the next node in document order, entering children first
    pub fn goto_next(&mut self) -> bool {
        if self.id + 1 < self.tree.nodes.len() {
            self.id += 1;
            true
        } else {
            false
        }
    }
}
