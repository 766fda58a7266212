// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # CLI Configuration
//!
//! Settings for the `logql-situation` binary. Values come from defaults, an
//! optional JSON file given with `--config`, and finally command-line flags.
//!
//! ## Example
//!
//! ```rust
//! use logql_cli::CliConfig;
//! use serde_json::json;
//!
//! let config = CliConfig::from_json(&json!({"cursorMarker": "§", "pretty": false})).unwrap();
//! assert_eq!(config.cursor_marker, '§');
//! assert!(!config.pretty);
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

/// Characters that already mean something in a LogQL query
const RESERVED_MARKERS: &[char] = &[
    '{', '}', '(', ')', '[', ']', ',', '|', '=', '!', '~', '"', '\'', '`',
];

/// Binary configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CliConfig {
    /// Character marking the cursor in the input when no offset is given
    pub cursor_marker: char,

    /// Pretty-print the JSON output
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            cursor_marker: '^',
            pretty: true,
        }
    }
}

impl CliConfig {
    /// Parse a configuration object, filling absent fields with defaults
    ///
    /// Expected shape:
    /// {
    ///   "cursorMarker": "^",
    ///   "pretty": true
    /// }
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let config = Self::deserialize(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_json(&value)
    }

    /// Validate the configuration
    ///
    /// The cursor marker must not be whitespace or a LogQL delimiter or
    /// operator character.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let marker = self.cursor_marker;
        if marker.is_whitespace() || RESERVED_MARKERS.contains(&marker) {
            return Err(ConfigError::InvalidMarker { marker });
        }
        Ok(())
    }

    /// Override the cursor marker
    pub fn with_marker(mut self, marker: char) -> Self {
        self.cursor_marker = marker;
        self
    }

    /// Override pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Marker collides with query syntax
    #[error("Invalid cursor marker {marker:?}: must not be whitespace or LogQL syntax")]
    InvalidMarker { marker: char },

    /// Malformed configuration document
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("Cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_is_valid() {
        let config = CliConfig::default();
        assert_eq!(config.cursor_marker, '^');
        assert!(config.pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = CliConfig::from_json(&json!({"pretty": false})).unwrap();
        assert_eq!(config, CliConfig::default().with_pretty(false));

        let config = CliConfig::from_json(&json!({})).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_from_json_rejects_reserved_marker() {
        for marker in ["|", "{", " ", "\""] {
            let result = CliConfig::from_json(&json!({ "cursorMarker": marker }));
            assert!(
                matches!(result, Err(ConfigError::InvalidMarker { .. })),
                "{marker:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_json_rejects_bad_shape() {
        assert!(matches!(
            CliConfig::from_json(&json!({"cursorMarker": "ab"})),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            CliConfig::from_json(&json!({"marker": "^"})),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = CliConfig::default().with_marker('@').with_pretty(false);
        assert_eq!(config.cursor_marker, '@');
        assert!(!config.pretty);
        assert!(config.validate().is_ok());
        assert!(CliConfig::default().with_marker(',').validate().is_err());
    }

    #[test]
    fn test_from_missing_file() {
        let result = CliConfig::from_file(Path::new("/nonexistent/logql-situation.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
