// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Request handling and output of the CLI library

use logql_cli::{CliConfig, Request, render};
use logql_context::Situation;
use logql_test_utils::{CURSOR_MARKER, LogqlFixtures, split_cursor};
use serde_json::{Value, json};

#[test]
fn test_default_marker_matches_fixture_marker() {
    assert_eq!(CliConfig::default().cursor_marker, CURSOR_MARKER);

    let input = r#"{job="x", ^"#;
    let request = Request::new(input, None, CURSOR_MARKER);
    assert_eq!(Some((request.text.clone(), request.pos)), split_cursor(input, CURSOR_MARKER));
}

#[test]
fn test_after_pipe_output() {
    let request = Request::new(r#"{job="x"} | ^"#, None, '^');
    let situation = request.resolve().unwrap();
    let output: Value = serde_json::from_str(&render(situation.as_ref(), true).unwrap()).unwrap();

    assert_eq!(
        output,
        json!({
            "type": "AFTER_SELECTOR",
            "afterPipe": true,
            "hasSpace": true,
            "logQuery": "{job=\"x\"} |",
        })
    );
}

#[test]
fn test_custom_marker() {
    let request = Request::new("sum(@", None, '@');
    assert_eq!(request.resolve().unwrap(), Some(Situation::InAggregation));
}

#[test]
fn test_no_situation_renders_null() {
    let request = Request::new(r#"{job="x"^"#, None, '^');
    let situation = request.resolve().unwrap();
    assert_eq!(render(situation.as_ref(), false).unwrap(), "null");
}

#[test]
fn test_fixture_queries_resolve_everywhere() {
    for query in LogqlFixtures::all() {
        for pos in 0..=query.len() {
            if !query.is_char_boundary(pos) {
                continue;
            }
            let request = Request::new(query, Some(pos), '^');
            assert!(request.resolve().is_ok(), "{query} at {pos}");
        }
    }
}
