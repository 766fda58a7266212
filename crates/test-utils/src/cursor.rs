// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Cursor markers
//!
//! Test inputs mark the cursor with a caret, `{job="x", ^`. `|` is a LogQL
//! operator and cannot serve as the marker.

/// Default cursor marker
pub const CURSOR_MARKER: char = '^';

/// Split `input` into the query text and the cursor offset, using `marker`
///
/// Only the first occurrence is treated as the cursor, so later carets inside
/// regex literals survive.
///
/// ```
/// use logql_test_utils::split_cursor;
///
/// let (text, pos) = split_cursor(r#"{job="^"}"#, '^').unwrap();
/// assert_eq!(text, r#"{job=""}"#);
/// assert_eq!(pos, 6);
/// ```
pub fn split_cursor(input: &str, marker: char) -> Option<(String, usize)> {
    let pos = input.find(marker)?;
    let mut text = String::with_capacity(input.len());
    text.push_str(&input[..pos]);
    text.push_str(&input[pos + marker.len_utf8()..]);
    Some((text, pos))
}
