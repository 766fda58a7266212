// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Log query extraction
//!
//! Reduces a metric query to the log query it wraps, so label and pipeline
//! suggestions can be computed against the stream selector alone.

use logql_grammar::{NodeKind, parse};

/// The log-query portion of `text`
///
/// Text without a metric expression is returned unchanged. Otherwise the
/// selector, pipeline and unwrap clause of the first log range expression are
/// joined with single spaces, leaving out the range itself. When no log range
/// exists the first selector is returned, or an empty string if there is none.
///
/// # Examples
///
/// ```
/// use logql_context::log_query::extract_log_query;
///
/// assert_eq!(extract_log_query(r#"{job="x"} | json"#), r#"{job="x"} | json"#);
/// assert_eq!(
///     extract_log_query(r#"sum(rate({job="x"} | json [5m]))"#),
///     r#"{job="x"} | json"#
/// );
/// ```
pub fn extract_log_query(text: &str) -> String {
    let tree = parse(text);

    if tree.nodes_of_kind(&[NodeKind::MetricExpr]).is_empty() {
        return text.to_string();
    }

    if let Some(log_range) = tree.nodes_of_kind(&[NodeKind::LogRangeExpr]).first() {
        return log_range
            .children()
            .filter(|c| {
                matches!(
                    c.kind(),
                    NodeKind::Selector | NodeKind::PipelineExpr | NodeKind::UnwrapExpr
                )
            })
            .map(|c| c.text(text))
            .collect::<Vec<_>>()
            .join(" ");
    }

    tree.nodes_of_kind(&[NodeKind::Selector])
        .first()
        .map(|selector| selector.text(text).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_query_is_identity() {
        let text = r#"{job="x"} | logfmt | level="error" "#;
        assert_eq!(extract_log_query(text), text);
        assert_eq!(extract_log_query("{"), "{");
    }

    #[test]
    fn test_metric_query_strips_range() {
        assert_eq!(
            extract_log_query(r#"count_over_time({a="b"}[5m])"#),
            r#"{a="b"}"#
        );
        assert_eq!(
            extract_log_query(r#"quantile_over_time(0.99, {c="o"} | json | unwrap latency [5m]) by (x)"#),
            r#"{c="o"} | json | unwrap latency"#
        );
    }

    #[test]
    fn test_range_first_form() {
        assert_eq!(
            extract_log_query(r#"rate({a="b"}[1m] | logfmt)"#),
            r#"{a="b"} | logfmt"#
        );
    }

    #[test]
    fn test_metric_without_selector() {
        assert_eq!(extract_log_query("sum("), "");
        assert_eq!(extract_log_query("1 + 2"), "");
    }
}
