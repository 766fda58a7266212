// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! LogQL Grammar
//!
//! This crate provides an error-tolerant LogQL parser producing a navigable
//! concrete syntax tree.
//!
//! ## Guarantees
//!
//! - **Total**: [`parse`] never fails and never panics; unparseable regions
//!   become [`NodeKind::Error`] nodes
//! - **Deterministic**: the same text always yields the same tree
//! - **Spanned**: every node carries a `[from, to)` byte span, and the root
//!   always covers the whole input
//!
//! ## Usage
//!
//! ```rust
//! use logql_grammar::{NodeKind, parse};
//!
//! let tree = parse(r#"{job="api"} | logfmt"#);
//! let selector = tree.nodes_of_kind(&[NodeKind::Selector])[0];
//! assert_eq!(selector.text(r#"{job="api"} | logfmt"#), r#"{job="api"}"#);
//! ```

pub mod kind;
pub mod lexer;
mod parser;
mod tree;

pub use kind::NodeKind;
pub use parser::{CONV_OPS, MAX_NESTING, RANGE_OPS, VECTOR_OPS};
pub use tree::{Node, Tree, TreeCursor};

/// Parse LogQL text into a syntax tree
pub fn parse(text: &str) -> Tree {
    let tree = parser::parse(text);
    tracing::debug!(
        len = text.len(),
        nodes = tree.len(),
        has_error = tree.has_error(),
        "parsed LogQL"
    );
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_deterministic() {
        let text = r#"sum by (job) (count_over_time({job="x"} | logfmt [5m]))"#;
        assert_eq!(parse(text).to_sexp(), parse(text).to_sexp());
    }

    #[test]
    fn test_tree_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tree>();
    }
}
