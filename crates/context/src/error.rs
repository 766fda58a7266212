// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Error types for situation resolution
//!
//! Structural mismatches never surface as errors: handlers that cannot make
//! sense of the tree return `Ok(None)`. The only hard failure is a quoted
//! value that is not delimited the way the grammar promises.

use thiserror::Error;

/// Result type alias for context operations
pub type ContextResult<T> = Result<T, ContextError>;

/// Errors that can abort a resolution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// A quoted value is not wrapped in matching `"`, `'` or `` ` `` delimiters
    #[error("Invalid string literal: {literal}")]
    InvalidLiteral { literal: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_literal() {
        let err = ContextError::InvalidLiteral {
            literal: "abc".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("abc"));
        assert!(msg.contains("Invalid string literal"));
    }
}
