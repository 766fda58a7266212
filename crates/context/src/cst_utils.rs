// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # CST utility functions
//!
//! Pure, value-returning navigation over a LogQL syntax tree, plus the cursor
//! locator and ancestor-chain builder used by situation resolution.
//!
//! Handlers never hold a stateful cursor. They describe the shape they expect
//! as a fixed list of [`Step`]s and [`walk`] it; any failed move or kind
//! mismatch yields `None`.

use logql_grammar::{Node, NodeKind, Tree};
use tracing::trace;

/// Direction of a single structural move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Parent,
    FirstChild,
    LastChild,
    NextSibling,
}

/// One move plus the kind the node reached by it must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub direction: Direction,
    pub kind: NodeKind,
}

impl Step {
    pub const fn parent(kind: NodeKind) -> Self {
        Self {
            direction: Direction::Parent,
            kind,
        }
    }

    pub const fn first_child(kind: NodeKind) -> Self {
        Self {
            direction: Direction::FirstChild,
            kind,
        }
    }

    pub const fn last_child(kind: NodeKind) -> Self {
        Self {
            direction: Direction::LastChild,
            kind,
        }
    }

    pub const fn next_sibling(kind: NodeKind) -> Self {
        Self {
            direction: Direction::NextSibling,
            kind,
        }
    }
}

/// Perform a single structural move
pub fn step<'t>(node: Node<'t>, direction: Direction) -> Option<Node<'t>> {
    match direction {
        Direction::Parent => node.parent(),
        Direction::FirstChild => node.first_child(),
        Direction::LastChild => node.last_child(),
        Direction::NextSibling => node.next_sibling(),
    }
}

/// Follow `path` from `node`
///
/// All-or-nothing: returns `None` as soon as a move is impossible or lands on
/// a node of the wrong kind.
///
/// # Examples
///
/// ```
/// use logql_context::cst_utils::{Step, walk};
/// use logql_grammar::{NodeKind, parse};
///
/// let tree = parse(r#"{job="api"}"#);
/// let selector = walk(
///     tree.root(),
///     &[
///         Step::last_child(NodeKind::Expr),
///         Step::last_child(NodeKind::LogExpr),
///         Step::first_child(NodeKind::Selector),
///     ],
/// );
/// assert!(selector.is_some());
/// ```
pub fn walk<'t>(node: Node<'t>, path: &[Step]) -> Option<Node<'t>> {
    path.iter().try_fold(node, |current, s| {
        step(current, s.direction).filter(|next| next.kind() == s.kind)
    })
}

/// Kinds from `node` up to the root, `node`'s own kind first
pub fn ancestor_chain(node: Node<'_>) -> Vec<NodeKind> {
    std::iter::successors(Some(node), |n| n.parent())
        .map(|n| n.kind())
        .collect()
}

/// Nearest strict ancestor of the given kind
pub fn find_ancestor<'t>(node: Node<'t>, kind: NodeKind) -> Option<Node<'t>> {
    std::iter::successors(node.parent(), |n| n.parent()).find(|n| n.kind() == kind)
}

/// Cursor offset with trailing whitespace past the end of the text ignored
///
/// # Examples
///
/// ```
/// use logql_context::cst_utils::effective_position;
///
/// assert_eq!(effective_position("{a=\"b\"} | ", 10), 9);
/// assert_eq!(effective_position("{a=\"b\"} | ", 3), 3);
/// ```
pub fn effective_position(text: &str, pos: usize) -> usize {
    pos.min(text.trim_end().len())
}

/// Find the node the cursor is anchored to
///
/// A zero-width error node sitting exactly at the effective position wins,
/// because on partial input it marks what the user is in the middle of
/// typing. Otherwise this is the innermost node strictly covering `pos`.
pub fn locate_anchor<'t>(tree: &'t Tree, text: &str, pos: usize) -> Node<'t> {
    let effective = effective_position(text, pos);

    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_error() && node.from() == effective && node.to() == effective {
            trace!(pos, effective, "anchored on zero-width error");
            return node;
        }
        if !cursor.goto_next() {
            break;
        }
    }

    let node = tree.node_at(pos);
    trace!(pos, kind = %node.kind(), "anchored on covering node");
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use logql_grammar::parse;

    #[test]
    fn test_walk_success_and_mismatch() {
        let source = r#"{job="api"}"#;
        let tree = parse(source);

        let path = [
            Step::last_child(NodeKind::Expr),
            Step::last_child(NodeKind::LogExpr),
            Step::first_child(NodeKind::Selector),
        ];
        let selector = walk(tree.root(), &path);
        assert_eq!(selector.map(|n| n.text(source)), Some(source));

        // wrong kind on the second step aborts the whole walk
        let path = [
            Step::last_child(NodeKind::Expr),
            Step::last_child(NodeKind::MetricExpr),
            Step::first_child(NodeKind::Selector),
        ];
        assert!(walk(tree.root(), &path).is_none());

        // impossible move
        assert!(walk(tree.root(), &[Step::parent(NodeKind::LogQL)]).is_none());
    }

    #[test]
    fn test_walk_empty_path_is_identity() {
        let tree = parse("{}");
        assert_eq!(walk(tree.root(), &[]), Some(tree.root()));
    }

    #[test]
    fn test_step_next_sibling() {
        let source = r#"{job="api"}"#;
        let tree = parse(source);
        let ident = tree.nodes_of_kind(&[NodeKind::Identifier])[0];

        let op = step(ident, Direction::NextSibling);
        assert_eq!(op.map(|n| n.kind()), Some(NodeKind::Eq));
        assert!(walk(ident, &[Step::next_sibling(NodeKind::Eq), Step::next_sibling(NodeKind::String)]).is_some());
    }

    #[test]
    fn test_ancestor_chain() {
        let tree = parse(r#"{job="api"}"#);
        let string = tree.nodes_of_kind(&[NodeKind::String])[0];

        assert_eq!(
            ancestor_chain(string),
            vec![
                NodeKind::String,
                NodeKind::Matcher,
                NodeKind::Matchers,
                NodeKind::Selector,
                NodeKind::LogExpr,
                NodeKind::Expr,
                NodeKind::LogQL,
            ]
        );
        assert_eq!(ancestor_chain(tree.root()), vec![NodeKind::LogQL]);
    }

    #[test]
    fn test_find_ancestor_is_strict() {
        let tree = parse(r#"{job="api"}"#);
        let selector = tree.nodes_of_kind(&[NodeKind::Selector])[0];
        assert!(find_ancestor(selector, NodeKind::Selector).is_none());
        assert!(find_ancestor(selector, NodeKind::LogQL).is_some());
    }

    #[test]
    fn test_locate_anchor_prefers_zero_width_error() {
        let text = r#"{job="x"} | "#;
        let tree = parse(text);
        let anchor = locate_anchor(&tree, text, text.len());

        assert!(anchor.is_error());
        assert_eq!(anchor.from(), 11);
        assert_eq!(
            ancestor_chain(anchor)[..3],
            [NodeKind::Error, NodeKind::PipelineStage, NodeKind::PipelineExpr]
        );
    }

    #[test]
    fn test_locate_anchor_falls_back_to_covering_node() {
        let text = r#"{job="x"}"#;
        let tree = parse(text);
        assert_eq!(locate_anchor(&tree, text, 7).kind(), NodeKind::String);
        assert_eq!(locate_anchor(&tree, text, text.len()).kind(), NodeKind::LogQL);
    }
}
