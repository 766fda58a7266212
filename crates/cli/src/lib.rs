// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # LogQL situation CLI
//!
//! Library half of the `logql-situation` binary: cursor handling, resolution
//! and JSON rendering. The binary only adds argument parsing and I/O.

pub mod config;

use logql_context::{ContextResult, Situation, resolve};
use logql_test_utils::split_cursor;
use tracing::debug;

pub use config::{CliConfig, ConfigError};

/// Query text with the cursor located
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub text: String,
    pub pos: usize,
}

impl Request {
    /// Build a request from raw input
    ///
    /// An explicit `pos` wins and the input is taken verbatim. Otherwise the
    /// first `marker` in the input is the cursor and is removed. Without a
    /// marker the cursor sits at the end.
    pub fn new(input: &str, pos: Option<usize>, marker: char) -> Self {
        if let Some(pos) = pos {
            return Self {
                text: input.to_string(),
                pos,
            };
        }

        match split_cursor(input, marker) {
            Some((text, pos)) => Self { text, pos },
            None => Self {
                text: input.to_string(),
                pos: input.len(),
            },
        }
    }

    pub fn resolve(&self) -> ContextResult<Option<Situation>> {
        debug!(text = %self.text, pos = self.pos, "resolving request");
        let situation = resolve(&self.text, self.pos)?;
        debug!(
            log_query = situation.as_ref().and_then(Situation::log_query),
            "request resolved"
        );
        Ok(situation)
    }
}

/// Render a resolution result as JSON, `null` when there is no situation
pub fn render(situation: Option<&Situation>, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(&situation)
    } else {
        serde_json::to_string(&situation)
    }
}

/// Drop one trailing line ending, as left by `echo` or a here-string
pub fn trim_line_ending(input: &str) -> &str {
    input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(input)
}
