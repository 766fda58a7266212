// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Cursor situations
//!
//! The closed classification returned to the completion layer. It serializes
//! as an internally tagged JSON object:
//!
//! ```json
//! {"type": "AFTER_SELECTOR", "afterPipe": true, "hasSpace": true, "logQuery": "{job=\"x\"} |"}
//! ```

use serde::{Deserialize, Serialize};

use crate::labels::Label;

/// Syntactic situation of the cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Situation {
    /// The document is empty
    Empty,

    /// A bare word typed at the top level, e.g. `cou|`
    AtRoot,

    /// Inside a logfmt parser stage, e.g. `{job="x"} | logfmt foo, |`
    #[serde(rename_all = "camelCase")]
    InLogfmt {
        /// Labels already extracted by the stage
        other_labels: Vec<String>,
        /// Whether parser flags were already given
        flags: bool,
        log_query: String,
    },

    /// Inside a range duration, e.g. `rate({job="x"}[|`
    InRange,

    /// Inside an aggregation body, e.g. `sum(|`
    InAggregation,

    /// Inside a `by (...)` or `without (...)` clause
    #[serde(rename_all = "camelCase")]
    InGrouping { log_query: String },

    /// At a label name position in a selector, e.g. `{job="x", |`
    #[serde(rename = "IN_LABEL_SELECTOR_NO_LABEL_NAME", rename_all = "camelCase")]
    InLabelSelectorNoName {
        /// Labels already present in the selector, in source order
        other_labels: Vec<Label>,
    },

    /// At a label value position in a selector, e.g. `{job="|"}`
    #[serde(rename = "IN_LABEL_SELECTOR_WITH_LABEL_NAME", rename_all = "camelCase")]
    InLabelSelectorWithName {
        label_name: String,
        /// Whether the cursor sits inside an opened quote
        between_quotes: bool,
        /// Labels of the selector other than `label_name`
        other_labels: Vec<Label>,
    },

    /// After a complete selector, optionally after a pipe
    #[serde(rename_all = "camelCase")]
    AfterSelector {
        after_pipe: bool,
        /// Whether the character before the cursor is a space
        has_space: bool,
        log_query: String,
    },

    /// After `| unwrap`
    #[serde(rename_all = "camelCase")]
    AfterUnwrap { log_query: String },

    /// After `| keep` or `| drop`
    #[serde(rename_all = "camelCase")]
    AfterKeepAndDrop {
        /// Query text before the keep/drop stage
        log_query: String,
    },
}

impl Situation {
    /// The log query carried by this situation, if any
    pub fn log_query(&self) -> Option<&str> {
        match self {
            Situation::InLogfmt { log_query, .. }
            | Situation::InGrouping { log_query }
            | Situation::AfterSelector { log_query, .. }
            | Situation::AfterUnwrap { log_query }
            | Situation::AfterKeepAndDrop { log_query } => Some(log_query.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelOperator;
    use serde_json::json;

    #[test]
    fn test_unit_variants_serialize_as_tag() {
        assert_eq!(serde_json::to_value(Situation::Empty).unwrap(), json!({"type": "EMPTY"}));
        assert_eq!(serde_json::to_value(Situation::AtRoot).unwrap(), json!({"type": "AT_ROOT"}));
        assert_eq!(
            serde_json::to_value(Situation::InAggregation).unwrap(),
            json!({"type": "IN_AGGREGATION"})
        );
    }

    #[test]
    fn test_fields_serialize_camel_case() {
        let ctx = Situation::AfterSelector {
            after_pipe: true,
            has_space: false,
            log_query: "{a=\"b\"}".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&ctx).unwrap(),
            json!({"type": "AFTER_SELECTOR", "afterPipe": true, "hasSpace": false, "logQuery": "{a=\"b\"}"})
        );
    }

    #[test]
    fn test_label_selector_names() {
        let ctx = Situation::InLabelSelectorWithName {
            label_name: "job".to_string(),
            between_quotes: true,
            other_labels: vec![Label::new("env", "prod", LabelOperator::Eq)],
        };
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["type"], "IN_LABEL_SELECTOR_WITH_LABEL_NAME");
        assert_eq!(value["labelName"], "job");
        assert_eq!(value["betweenQuotes"], true);
        assert_eq!(value["otherLabels"][0]["op"], "=");

        let back: Situation = serde_json::from_value(value).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_log_query_accessor() {
        let ctx = Situation::AfterUnwrap {
            log_query: "{a=\"b\"} | json | unwrap".to_string(),
        };
        assert_eq!(ctx.log_query(), Some("{a=\"b\"} | json | unwrap"));
        assert_eq!(Situation::InRange.log_query(), None);
    }
}
