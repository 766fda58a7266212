// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Label matcher extraction
//!
//! Recovers the `name op "value"` matchers already present in a selector.

use std::fmt;

use logql_grammar::{Node, NodeKind};
use serde::{Deserialize, Serialize};

use crate::error::{ContextError, ContextResult};

/// Matcher operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = "=~")]
    Re,
    #[serde(rename = "!~")]
    Nre,
}

impl LabelOperator {
    /// Map an operator token to its operator, `None` for anything else
    pub fn from_kind(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Eq => Some(LabelOperator::Eq),
            NodeKind::Neq => Some(LabelOperator::Neq),
            NodeKind::Re => Some(LabelOperator::Re),
            NodeKind::Nre => Some(LabelOperator::Nre),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelOperator::Eq => "=",
            LabelOperator::Neq => "!=",
            LabelOperator::Re => "=~",
            LabelOperator::Nre => "!~",
        }
    }
}

impl fmt::Display for LabelOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A label matcher found in a selector, value already unescaped
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: String,
    pub op: LabelOperator,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>, op: LabelOperator) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            op,
        }
    }
}

/// Strip the delimiters of a quoted literal and undo quote escaping
///
/// `"…"` unescapes only `\"` and `'…'` only `\'`; other escape sequences are
/// left as written. Backtick literals are returned verbatim.
///
/// # Examples
///
/// ```
/// use logql_context::labels::unescape_literal;
///
/// assert_eq!(unescape_literal(r#""x\"y""#).unwrap(), r#"x"y"#);
/// assert_eq!(unescape_literal(r#"`a\"b`"#).unwrap(), r#"a\"b"#);
/// assert!(unescape_literal("abc").is_err());
/// ```
pub fn unescape_literal(raw: &str) -> ContextResult<String> {
    let invalid = || ContextError::InvalidLiteral {
        literal: raw.to_string(),
    };

    let delimiter = raw.chars().next().ok_or_else(invalid)?;
    if !matches!(delimiter, '"' | '\'' | '`') || raw.len() < 2 || !raw.ends_with(delimiter) {
        return Err(invalid());
    }

    let inner = &raw[1..raw.len() - 1];
    let value = match delimiter {
        '"' => inner.replace("\\\"", "\""),
        '\'' => inner.replace("\\'", "'"),
        _ => inner.to_string(),
    };
    Ok(value)
}

/// Extract the label of a `Matcher` node
///
/// Returns `Ok(None)` when any part is missing or the operator is not a
/// matcher operator.
pub fn extract_label(matcher: Node<'_>, text: &str) -> ContextResult<Option<Label>> {
    if matcher.kind() != NodeKind::Matcher {
        return Ok(None);
    }

    let Some(name) = matcher.first_child().filter(|n| n.kind() == NodeKind::Identifier) else {
        return Ok(None);
    };
    let Some(op_node) = name.next_sibling() else {
        return Ok(None);
    };
    let Some(op) = LabelOperator::from_kind(op_node.kind()) else {
        return Ok(None);
    };
    let Some(value) = op_node.next_sibling().filter(|n| n.kind() == NodeKind::String) else {
        return Ok(None);
    };

    Ok(Some(Label {
        name: name.text(text).to_string(),
        value: unescape_literal(value.text(text))?,
        op,
    }))
}

/// All labels of a selector, in source order
///
/// The matcher list nests to the left, so the walk visits the last matcher
/// first and the result is reversed at the end.
pub fn extract_labels(selector: Node<'_>, text: &str) -> ContextResult<Vec<Label>> {
    let mut labels = Vec::new();
    let mut list = selector.child_of_kind(NodeKind::Matchers);

    while let Some(node) = list {
        if let Some(matcher) = node.last_child().filter(|n| n.kind() == NodeKind::Matcher)
            && let Some(label) = extract_label(matcher, text)?
        {
            labels.push(label);
        }
        list = node.first_child().filter(|n| n.kind() == NodeKind::Matchers);
    }

    labels.reverse();
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logql_grammar::parse;

    fn selector_labels(text: &str) -> Vec<Label> {
        let tree = parse(text);
        let selector = tree.nodes_of_kind(&[NodeKind::Selector])[0];
        extract_labels(selector, text).unwrap()
    }

    #[test]
    fn test_unescape_double_quotes() {
        assert_eq!(unescape_literal(r#""x\"y""#).unwrap(), r#"x"y"#);
        // other escapes are left alone
        assert_eq!(unescape_literal(r#""a\nb\'c""#).unwrap(), r#"a\nb\'c"#);
    }

    #[test]
    fn test_unescape_single_quotes() {
        assert_eq!(unescape_literal(r"'it\'s'").unwrap(), "it's");
        assert_eq!(unescape_literal(r#"'say \"hi\"'"#).unwrap(), r#"say \"hi\""#);
    }

    #[test]
    fn test_unescape_backticks_verbatim() {
        assert_eq!(unescape_literal(r#"`a\"b`"#).unwrap(), r#"a\"b"#);
        assert_eq!(unescape_literal("``").unwrap(), "");
    }

    #[test]
    fn test_unescape_rejects_undelimited() {
        for raw in ["", "abc", "\"", "\"abc", "'abc\"", "`abc", "abc\""] {
            assert!(
                matches!(unescape_literal(raw), Err(ContextError::InvalidLiteral { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_extract_labels_in_source_order() {
        let labels = selector_labels(r#"{a="1", b!="2", c=~"3", d!~"4"}"#);
        assert_eq!(
            labels,
            vec![
                Label::new("a", "1", LabelOperator::Eq),
                Label::new("b", "2", LabelOperator::Neq),
                Label::new("c", "3", LabelOperator::Re),
                Label::new("d", "4", LabelOperator::Nre),
            ]
        );
    }

    #[test]
    fn test_extract_labels_skips_incomplete_matchers() {
        let labels = selector_labels(r#"{a="1", b="#);
        assert_eq!(labels, vec![Label::new("a", "1", LabelOperator::Eq)]);
    }

    #[test]
    fn test_extract_labels_empty_selector() {
        assert!(selector_labels("{}").is_empty());
        assert!(selector_labels("{").is_empty());
    }

    #[test]
    fn test_extract_label_requires_matcher() {
        let text = r#"{a="1"}"#;
        let tree = parse(text);
        let selector = tree.nodes_of_kind(&[NodeKind::Selector])[0];
        assert_eq!(extract_label(selector, text), Ok(None));
    }

    #[test]
    fn test_operator_serialization() {
        let label = Label::new("job", "x", LabelOperator::Re);
        let json = serde_json::to_value(&label).unwrap();
        assert_eq!(json, serde_json::json!({"name": "job", "value": "x", "op": "=~"}));
        assert_eq!(LabelOperator::Nre.to_string(), "!~");
    }
}
