// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Gastobot expense bot.

use thiserror::Error;

/// The primary error type used across all Gastobot crates.
#[derive(Debug, Error)]
pub enum GastobotError {
    /// Configuration errors (missing credential, invalid TOML, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, DDL failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat transport errors (Telegram API failure, send failure, bad payload).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Classifier gateway errors (API unreachable, malformed or missing output).
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
