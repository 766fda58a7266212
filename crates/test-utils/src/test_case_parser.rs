// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! YAML test case format
//!
//! A case file is a YAML list. Each case carries a description, an input with
//! a cursor marker and an optional expectation; a missing or `null`
//! expectation means "no situation".
//!
//! ```yaml
//! - description: label value after operator
//!   input: '{job=^'
//!   expected:
//!     type: IN_LABEL_SELECTOR_WITH_LABEL_NAME
//!     labelName: job
//!     betweenQuotes: false
//!     otherLabels: []
//! ```
//!
//! The expectation type is chosen by the caller, so this crate stays free of
//! the crates it is used to test.

use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::cursor::{CURSOR_MARKER, split_cursor};

/// A single test case definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestCase<T> {
    pub description: String,
    /// Query text with one cursor marker
    pub input: String,
    /// Absent or `null` means no situation
    pub expected: Option<T>,
}

/// Parse errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Empty test case file")]
    EmptyFile,

    #[error("Case '{0}' has no cursor marker")]
    MissingCursor(String),
}

impl<T> TestCase<T> {
    /// Query text without the marker, and the cursor offset
    pub fn text_and_position(&self) -> Result<(String, usize), ParseError> {
        split_cursor(&self.input, CURSOR_MARKER)
            .ok_or_else(|| ParseError::MissingCursor(self.description.clone()))
    }
}

/// Parse a test case file
pub fn parse_test_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<TestCase<T>>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_test_content(&content)
}

/// Parse test case content from a string
pub fn parse_test_content<T: DeserializeOwned>(content: &str) -> Result<Vec<TestCase<T>>, ParseError> {
    if content.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let cases: Vec<TestCase<T>> = serde_yaml::from_str(content)?;
    if cases.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    if let Some(case) = cases.iter().find(|c| !c.input.contains(CURSOR_MARKER)) {
        return Err(ParseError::MissingCursor(case.description.clone()));
    }

    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_parse_cases() {
        let content = r#"
- description: label value
  input: '{job=^'
  expected:
    type: IN_LABEL_SELECTOR_WITH_LABEL_NAME
    labelName: job
- description: no situation
  input: '{job="x"^'
- description: explicit null
  input: '{job="x"^'
  expected: null
"#;
        let cases: Vec<TestCase<Value>> = parse_test_content(content).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].description, "label value");
        assert_eq!(
            cases[0].expected,
            Some(json!({"type": "IN_LABEL_SELECTOR_WITH_LABEL_NAME", "labelName": "job"}))
        );
        assert_eq!(cases[1].expected, None);
        assert_eq!(cases[2].expected, None);

        let (text, pos) = cases[0].text_and_position().unwrap();
        assert_eq!(text, "{job=");
        assert_eq!(pos, 5);
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            parse_test_content::<Value>("  \n"),
            Err(ParseError::EmptyFile)
        ));
        assert!(matches!(
            parse_test_content::<Value>("[]"),
            Err(ParseError::EmptyFile)
        ));
    }

    #[test]
    fn test_missing_cursor() {
        let content = "- description: no marker\n  input: '{job=\"x\"}'\n";
        match parse_test_content::<Value>(content) {
            Err(ParseError::MissingCursor(name)) => assert_eq!(name, "no marker"),
            other => panic!("expected MissingCursor, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            parse_test_content::<Value>("- description: [unclosed"),
            Err(ParseError::Yaml(_))
        ));
    }
}
