// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Grammar API integration tests
//!
//! Tests for `parse()` and the tree navigation surface.

use logql_grammar::{NodeKind, parse};

#[test]
fn test_parse_simple_log_query() {
    let source = r#"{job="api", env=~"prod|staging"} |= "error" | logfmt | level="warn""#;
    let tree = parse(source);

    assert!(!tree.has_error(), "unexpected errors: {}", tree.to_sexp());
    assert_eq!(tree.root().kind(), NodeKind::LogQL);
}

#[test]
fn test_parse_metric_queries() {
    let sources = vec![
        r#"rate({job="api"}[5m])"#,
        r#"sum by (job) (count_over_time({job="api"} | json [1h30m]))"#,
        r#"topk(10, sum without (pod) (bytes_rate({app="x"}[1m])))"#,
        r#"quantile_over_time(0.99, {c="o"} | logfmt | unwrap duration(latency) [5m]) by (path)"#,
        r#"vector(1) + 2 * -3"#,
        r#"(sum(rate({a="b"}[5m])))"#,
    ];

    for source in sources {
        let tree = parse(source);
        assert!(!tree.has_error(), "{source}: {}", tree.to_sexp());
    }
}

#[test]
fn test_parse_pipeline_stages() {
    let source = concat!(
        r#"{a="b"} | json foo="bar", baz | unpack | regexp "(?P<x>.*)" | pattern "<_> <y>""#,
        r#" | line_format "{{.x}}" | label_format dst=src, t="{{.y}}" | decolorize"#,
        r#" | keep a, b="c" | drop d | status >= 400 | latency > 10s"#,
    );
    let tree = parse(source);

    assert!(!tree.has_error(), "{}", tree.to_sexp());
    let stages = tree.nodes_of_kind(&[NodeKind::PipelineStage]);
    assert_eq!(stages.len(), 11);
}

#[test]
fn test_node_text_and_spans() {
    let source = r#"{job="api"} | logfmt"#;
    let tree = parse(source);

    let selector = tree.nodes_of_kind(&[NodeKind::Selector])[0];
    assert_eq!(selector.text(source), r#"{job="api"}"#);

    let logfmt = tree.nodes_of_kind(&[NodeKind::LogfmtParser])[0];
    assert_eq!(logfmt.text(source), "logfmt");
    assert_eq!(logfmt.to(), source.len());

    let string = tree.nodes_of_kind(&[NodeKind::String])[0];
    assert_eq!(string.text(source), r#""api""#);
}

#[test]
fn test_strings_keep_delimiters() {
    let source = r#"{a="x\"y", b='z', c=`w\`} |= "q""#;
    let tree = parse(source);

    for node in tree.nodes_of_kind(&[NodeKind::String]) {
        let text = node.text(source);
        assert!(text.len() >= 2, "{text}");
        assert_eq!(text.chars().next(), text.chars().last(), "{text}");
    }
}

#[test]
fn test_child_of_kind() {
    let source = r#"{a="b"} | json"#;
    let tree = parse(source);

    let log_expr = tree.nodes_of_kind(&[NodeKind::LogExpr])[0];
    assert!(log_expr.child_of_kind(NodeKind::Selector).is_some());
    assert!(log_expr.child_of_kind(NodeKind::PipelineExpr).is_some());
    assert!(log_expr.child_of_kind(NodeKind::UnwrapExpr).is_none());
}

#[test]
fn test_cursor_at_position() {
    let source = r#"{job="api"}"#;
    let tree = parse(source);

    let cursor = tree.cursor_at(7);
    assert_eq!(cursor.node().kind(), NodeKind::String);

    // zero-width and boundary positions fall back to an enclosing node
    assert_eq!(tree.cursor_at(0).node().kind(), NodeKind::LogQL);
    assert_eq!(tree.cursor_at(source.len()).node().kind(), NodeKind::LogQL);
}

#[test]
fn test_nodes_of_kind_document_order() {
    let source = r#"{job="x"} | logfmt a, b | logfmt c"#;
    let tree = parse(source);

    let names: Vec<_> = tree
        .nodes_of_kind(&[NodeKind::LabelExtractionExpression])
        .into_iter()
        .map(|n| n.text(source))
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_parse_never_panics_on_garbage() {
    let inputs = [
        "}{", "|||", "[[[", "sum(((", "!", "--", "# comment only", "{a=\"", "rate(5m]", "µ", "{a=\"b\"} | logfmt --bogus",
    ];
    for input in inputs {
        let tree = parse(input);
        assert_eq!(tree.root().to(), input.len(), "{input}");
    }
}
