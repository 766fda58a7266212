// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures and sample LogQL queries

/// Sample LogQL queries for testing
pub struct LogqlFixtures;

impl LogqlFixtures {
    // ===== Log queries =====

    /// Single matcher selector
    pub const fn simple_selector() -> &'static str {
        r#"{job="api"}"#
    }

    /// Selector using every matcher operator
    pub const fn all_matcher_ops() -> &'static str {
        r#"{job="api", env!="dev", pod=~"api-.*", ns!~"kube-.*"}"#
    }

    /// Line filters followed by a parser and a label filter
    pub const fn filtered_logfmt() -> &'static str {
        r#"{job="api"} |= "error" != "timeout" | logfmt | level="error""#
    }

    /// One of each pipeline stage
    pub const fn all_stages() -> &'static str {
        r#"{job="api"} | json | logfmt --strict | regexp "(?P<ip>\\S+)" | pattern "<_> <status>" | unpack | line_format "{{.msg}}" | label_format dst=src | keep a, b | drop c | decolorize | status >= 400"#
    }

    // ===== Metric queries =====

    /// Range aggregation
    pub const fn count_over_time() -> &'static str {
        r#"count_over_time({job="api"}[5m])"#
    }

    /// Vector aggregation with grouping over a rate
    pub const fn sum_by_rate() -> &'static str {
        r#"sum by (status) (rate({job="api"} | json [1m]))"#
    }

    /// Unwrapped range aggregation with a parameter
    pub const fn quantile_unwrap() -> &'static str {
        r#"quantile_over_time(0.99, {job="api"} | json | unwrap latency [5m]) by (route)"#
    }

    /// Binary expression between two metric queries
    pub const fn binary_metric() -> &'static str {
        r#"sum(rate({job="api"}[1m])) / sum(rate({job="web"}[1m])) * 100"#
    }

    /// Every sample query, log queries first
    pub fn all() -> Vec<&'static str> {
        vec![
            Self::simple_selector(),
            Self::all_matcher_ops(),
            Self::filtered_logfmt(),
            Self::all_stages(),
            Self::count_over_time(),
            Self::sum_by_rate(),
            Self::quantile_unwrap(),
            Self::binary_metric(),
        ]
    }
}
