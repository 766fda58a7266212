// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Situation resolution benchmarks
//!
//! Measures parsing and full resolution on typical partial queries.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use logql_context::resolve;
use logql_grammar::parse;
use logql_test_utils::{CURSOR_MARKER, LogqlFixtures, split_cursor};

const PARTIAL_QUERIES: &[(&str, &str)] = &[
    ("label_name", r#"{job="api", env=~"prod.*", ^"#),
    ("label_value", r#"{job="api", env="^"}"#),
    ("after_pipe", r#"{job="api"} |= "error" | ^"#),
    ("logfmt", r#"{job="api"} | logfmt --strict a, b="c", ^"#),
    ("grouping", r#"sum by (^) (rate({job="api"} | json [5m]))"#),
    ("unwrap", r#"quantile_over_time(0.99, {job="api"} | json | unwrap ^"#),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("grammar/parse");
    for (i, query) in LogqlFixtures::all().into_iter().enumerate() {
        group.bench_with_input(BenchmarkId::from_parameter(i), query, |b, query| {
            b.iter(|| black_box(parse(black_box(query))));
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("context/resolve");
    for (name, input) in PARTIAL_QUERIES {
        let Some((text, pos)) = split_cursor(input, CURSOR_MARKER) else {
            continue;
        };
        group.bench_function(*name, |b| {
            b.iter(|| black_box(resolve(black_box(&text), black_box(pos))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_resolve);
criterion_main!(benches);
