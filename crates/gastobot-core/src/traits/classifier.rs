// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier gateway trait.

use async_trait::async_trait;

use crate::error::GastobotError;
use crate::types::ClassifierVerdict;

/// Contract around the external classification / reply-generation service.
///
/// Given the message text (or `None` when the message carries no usable
/// text) and an optional sender hint, the backing service returns exactly
/// one classification and a bounded reply string. Unreachable service,
/// malformed output, and missing output all surface as
/// [`GastobotError::Classifier`].
///
/// [`GastobotError::Classifier`]: crate::error::GastobotError::Classifier
#[async_trait]
pub trait ExpenseClassifier: Send + Sync {
    async fn classify(
        &self,
        text: Option<&str>,
        sender: Option<&str>,
    ) -> Result<ClassifierVerdict, GastobotError>;
}
