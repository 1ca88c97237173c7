// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Gastobot expense bot.
//!
//! This crate provides the error type, domain types, and the trait seams
//! (storage, classifier) used throughout the Gastobot workspace. Transport
//! and persistence crates implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GastobotError;
pub use traits::{ExpenseClassifier, MessageStore};
pub use types::{
    ChatMessage, Classification, ClassifierVerdict, MessageContent, MessageRef, MessageType,
    OutboundReply, StoredMessage,
};
