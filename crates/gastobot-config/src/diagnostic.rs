// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error type and plain-text rendering.

use thiserror::Error;

/// A configuration error: either a parse/extract failure from Figment or a
/// semantic validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parse or type extraction error.
    #[error("config parse error: {message}")]
    Parse { message: String },

    /// Semantic validation error.
    #[error("config validation error: {message}")]
    Validation { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Parse {
            message: err.to_string(),
        }
    }
}

/// Render configuration errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("gastobot: {error}");
    }
}
