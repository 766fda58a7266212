// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Situation handlers
//!
//! One handler per registry entry. Each receives the anchor node, the full
//! text and the cursor offset, checks the local tree shape and either
//! produces a [`Situation`] or rejects with `Ok(None)` so dispatch can try the
//! next candidate.

use logql_grammar::{Node, NodeKind, parse};
use tracing::trace;

use crate::cst_utils::{Step, effective_position, find_ancestor, walk};
use crate::error::ContextResult;
use crate::labels::{LabelOperator, extract_labels};
use crate::log_query::extract_log_query;
use crate::situation::Situation;

fn trimmed_log_query(text: &str) -> String {
    extract_log_query(text).trim().to_string()
}

/// Text before the cursor, or the whole text if `pos` is not a boundary
fn text_before(text: &str, pos: usize) -> &str {
    text.get(..pos).unwrap_or(text)
}

/// Label name position inside `{...}`
pub fn resolve_selector(node: Node<'_>, text: &str, pos: usize) -> ContextResult<Option<Situation>> {
    let selector = if node.kind() == NodeKind::Selector {
        node
    } else {
        let mut current = node.parent();
        loop {
            match current {
                Some(n) if n.kind() == NodeKind::Selector => break n,
                Some(n) if matches!(n.kind(), NodeKind::Matchers | NodeKind::Error) => {
                    current = n.parent();
                }
                _ => return Ok(None),
            }
        }
    };

    // `{job="x"|` has no comma yet, so a label name cannot start here
    if let Some(matchers) = selector.child_of_kind(NodeKind::Matchers) {
        let between = text.get(matchers.to()..pos).unwrap_or("");
        if !between.trim().ends_with(',') {
            trace!(between, "no comma after last matcher");
            return Ok(None);
        }
    }

    Ok(Some(Situation::InLabelSelectorNoName {
        other_labels: extract_labels(selector, text)?,
    }))
}

/// Label value position, `{job=|` or `{job="|"}`
pub fn resolve_matcher(node: Node<'_>, text: &str, _pos: usize) -> ContextResult<Option<Situation>> {
    let between_quotes = !node.is_error();

    let Some(matcher) = node.parent().filter(|n| n.kind() == NodeKind::Matcher) else {
        return Ok(None);
    };
    let Some(name) = matcher.first_child().filter(|n| n.kind() == NodeKind::Identifier) else {
        return Ok(None);
    };
    let Some(op) = name.next_sibling().and_then(|n| LabelOperator::from_kind(n.kind())) else {
        trace!("matcher has no operator");
        return Ok(None);
    };

    let mut current = matcher.parent();
    let selector = loop {
        match current {
            Some(n) if n.kind() == NodeKind::Matchers => current = n.parent(),
            Some(n) if n.kind() == NodeKind::Selector => break n,
            _ => return Ok(None),
        }
    };

    let label_name = name.text(text).to_string();
    trace!(%label_name, %op, between_quotes, "matcher value");
    let other_labels = extract_labels(selector, text)?
        .into_iter()
        .filter(|label| label.name != label_name)
        .collect();

    Ok(Some(Situation::InLabelSelectorWithName {
        label_name,
        between_quotes,
        other_labels,
    }))
}

/// Cursor on the document root
pub fn resolve_top_level(node: Node<'_>, text: &str, pos: usize) -> ContextResult<Option<Situation>> {
    let log_expr = walk(
        node,
        &[
            Step::last_child(NodeKind::Expr),
            Step::last_child(NodeKind::LogExpr),
        ],
    );
    if let Some(log_expr) = log_expr {
        return resolve_log_or_log_range(log_expr, text, pos, false);
    }

    let bare_word = walk(
        node,
        &[
            Step::first_child(NodeKind::Error),
            Step::first_child(NodeKind::Identifier),
        ],
    );
    if bare_word.is_some() {
        return Ok(Some(Situation::AtRoot));
    }

    Ok(None)
}

/// After the selector of a log or log range expression
pub fn resolve_log_or_log_range(
    node: Node<'_>,
    text: &str,
    pos: usize,
    after_pipe: bool,
) -> ContextResult<Option<Situation>> {
    let Some(selector) = node.first_child().filter(|n| n.kind() == NodeKind::Selector) else {
        return Ok(None);
    };
    if selector.to() > pos {
        trace!(selector_end = selector.to(), pos, "cursor inside selector");
        return Ok(None);
    }

    Ok(Some(Situation::AfterSelector {
        after_pipe,
        has_space: text_before(text, pos).ends_with(' '),
        log_query: trimmed_log_query(text),
    }))
}

fn ends_with_pipe(text: &str, pos: usize) -> bool {
    text_before(text, pos).trim_end().ends_with('|')
}

pub fn resolve_log_range(node: Node<'_>, text: &str, pos: usize) -> ContextResult<Option<Situation>> {
    resolve_log_or_log_range(node, text, pos, ends_with_pipe(text, pos))
}

pub fn resolve_log_range_from_error(node: Node<'_>, text: &str, pos: usize) -> ContextResult<Option<Situation>> {
    let Some(log_range) = node.parent().filter(|n| n.kind() == NodeKind::LogRangeExpr) else {
        return Ok(None);
    };
    resolve_log_or_log_range(log_range, text, pos, ends_with_pipe(text, pos))
}

pub fn resolve_durations(_node: Node<'_>, _text: &str, _pos: usize) -> ContextResult<Option<Situation>> {
    Ok(Some(Situation::InRange))
}

pub fn resolve_in_aggregation(_node: Node<'_>, _text: &str, _pos: usize) -> ContextResult<Option<Situation>> {
    Ok(Some(Situation::InAggregation))
}

/// Inside `by (...)` of a vector aggregation over a range aggregation
pub fn resolve_labels_for_grouping(node: Node<'_>, text: &str, _pos: usize) -> ContextResult<Option<Situation>> {
    let Some(aggregation) = node
        .parent()
        .filter(|n| n.kind() == NodeKind::VectorAggregationExpr)
    else {
        return Ok(None);
    };
    let Some(body) = aggregation.child_of_kind(NodeKind::MetricExpr) else {
        return Ok(None);
    };

    let selector = walk(
        body,
        &[
            Step::first_child(NodeKind::RangeAggregationExpr),
            Step::last_child(NodeKind::LogRangeExpr),
            Step::first_child(NodeKind::Selector),
        ],
    );
    if selector.is_none() {
        trace!("grouping without a range aggregation body");
        return Ok(None);
    }

    Ok(Some(Situation::InGrouping {
        log_query: trimmed_log_query(text),
    }))
}

/// Right after `|` with nothing valid typed yet
pub fn resolve_pipe_error(node: Node<'_>, text: &str, pos: usize) -> ContextResult<Option<Situation>> {
    let pipeline = walk(
        node,
        &[
            Step::parent(NodeKind::PipelineStage),
            Step::parent(NodeKind::PipelineExpr),
        ],
    );
    let Some(parent) = pipeline.and_then(|p| p.parent()) else {
        return Ok(None);
    };

    match parent.kind() {
        NodeKind::LogExpr | NodeKind::LogRangeExpr => resolve_log_or_log_range(parent, text, pos, true),
        _ => Ok(None),
    }
}

pub fn resolve_after_unwrap(_node: Node<'_>, text: &str, _pos: usize) -> ContextResult<Option<Situation>> {
    Ok(Some(Situation::AfterUnwrap {
        log_query: trimmed_log_query(text),
    }))
}

/// After `| keep` or `| drop`; the log query stops before that stage
pub fn resolve_after_keep_and_drop(node: Node<'_>, text: &str, _pos: usize) -> ContextResult<Option<Situation>> {
    let prefix = match find_ancestor(node, NodeKind::PipelineStage) {
        Some(stage) => text.get(..stage.from()).unwrap_or(text),
        None => text,
    };

    Ok(Some(Situation::AfterKeepAndDrop {
        log_query: trimmed_log_query(prefix),
    }))
}

fn is_logfmt_parser(node: Node<'_>, pos: usize) -> bool {
    matches!(
        node.kind(),
        NodeKind::LogfmtParser | NodeKind::LogfmtExpressionParser
    ) && node.from() <= pos
        && pos <= node.to()
}

/// Inside or right after a logfmt parser stage
pub fn resolve_logfmt_parser(_node: Node<'_>, text: &str, pos: usize) -> ContextResult<Option<Situation>> {
    let tree = parse(text);
    let effective = effective_position(text, pos);

    // the covering node may be a token inside the stage, e.g. `--str|ict`
    let mut cursor = tree.cursor_at(effective);
    let mut in_logfmt = std::iter::successors(Some(cursor.node()), |n| n.parent())
        .any(|n| is_logfmt_parser(n, effective));
    while !in_logfmt && cursor.goto_next() {
        in_logfmt = is_logfmt_parser(cursor.node(), effective);
    }
    if !in_logfmt {
        return Ok(None);
    }

    let flags = tree.nodes_of_kind(&[NodeKind::ParserFlag]).len() > 1;
    let other_labels = tree
        .nodes_of_kind(&[NodeKind::LabelExtractionExpression])
        .into_iter()
        .filter_map(|expr| expr.child_of_kind(NodeKind::Identifier))
        .map(|ident| ident.text(text).to_string())
        .collect();

    Ok(Some(Situation::InLogfmt {
        other_labels,
        flags,
        log_query: trimmed_log_query(text),
    }))
}
