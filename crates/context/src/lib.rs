// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # LogQL Context Detection Layer
//!
//! This crate determines the syntactic situation of the cursor in a partially
//! typed LogQL query, so a completion layer can offer label names, values,
//! pipeline stages or range durations.
//!
//! ## Overview
//!
//! Resolution runs in four steps:
//!
//! 1. Parse the text with the error-tolerant `logql-grammar` parser
//! 2. Locate the anchor node at the cursor, preferring a zero-width error node
//!    ([`cst_utils::locate_anchor`])
//! 3. Build the chain of ancestor kinds ([`cst_utils::ancestor_chain`])
//! 4. Match the chain against the ordered resolver table and run the handler
//!    of the first matching prefix ([`resolvers::dispatch`])
//!
//! ## Examples
//!
//! ```rust
//! use logql_context::{Situation, resolve};
//!
//! let query = r#"{job="api"} | "#;
//! let situation = resolve(query, query.len()).unwrap();
//!
//! assert_eq!(
//!     situation,
//!     Some(Situation::AfterSelector {
//!         after_pipe: true,
//!         has_space: true,
//!         log_query: r#"{job="api"} |"#.to_string(),
//!     })
//! );
//! ```

pub mod cst_utils;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod log_query;
pub mod resolvers;
pub mod situation;

use logql_grammar::parse;
use tracing::debug;

// Re-export commonly used types
pub use cst_utils::{Direction, Step, ancestor_chain, effective_position, locate_anchor, step, walk};
pub use error::{ContextError, ContextResult};
pub use labels::{Label, LabelOperator, extract_label, extract_labels, unescape_literal};
pub use log_query::extract_log_query;
pub use resolvers::{Resolver, dispatch, registry};
pub use situation::Situation;

/// Resolve the situation of the cursor at byte offset `pos` in `text`
///
/// Returns `Ok(None)` when no completion situation applies. A `pos` past the
/// end of `text` is clamped to its length.
pub fn resolve(text: &str, pos: usize) -> ContextResult<Option<Situation>> {
    if text.is_empty() {
        return Ok(Some(Situation::Empty));
    }

    let pos = pos.min(text.len());
    let tree = parse(text);
    let anchor = locate_anchor(&tree, text, pos);
    let chain = ancestor_chain(anchor);
    debug!(pos, anchor = ?anchor, ?chain, "resolving situation");

    resolvers::dispatch(&chain, anchor, text, pos)
}
