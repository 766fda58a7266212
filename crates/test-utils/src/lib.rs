// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for logql-situation
//!
//! This crate provides common testing components including:
//! - Cursor marker handling for queries written with an inline caret
//! - A YAML test case format with typed expectations
//! - Sample LogQL queries

pub mod cursor;
pub mod fixtures;
pub mod test_case_parser;

// Re-exports for convenience
pub use cursor::{CURSOR_MARKER, split_cursor};
pub use fixtures::LogqlFixtures;
pub use test_case_parser::{ParseError, TestCase, parse_test_content, parse_test_file};
