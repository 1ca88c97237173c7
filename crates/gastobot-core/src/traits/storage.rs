// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for the durable message store.

use async_trait::async_trait;

use crate::error::GastobotError;
use crate::types::StoredMessage;

/// Exclusive owner of message persistence.
///
/// `upsert_message` is keyed on the message's record id: insert if absent,
/// else overwrite every mapped field (last write wins). Redelivering the
/// same update therefore never duplicates a row or violates a constraint.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn upsert_message(&self, message: &StoredMessage) -> Result<(), GastobotError>;
}
