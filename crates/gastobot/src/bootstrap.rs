// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wiring for the transport subcommands.

use std::sync::Arc;

use gastobot_agent::Intake;
use gastobot_config::GastobotConfig;
use gastobot_core::GastobotError;
use gastobot_openai::OpenAiClassifier;
use gastobot_storage::SqliteStorage;

/// Builds the storage and intake orchestrator both transports share.
///
/// The storage handle is returned separately so each transport decides
/// when to open it: `serve` eagerly at startup, the gateway lazily on the
/// first webhook call.
pub fn build_intake(
    config: &GastobotConfig,
) -> Result<(Arc<SqliteStorage>, Arc<Intake>), GastobotError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    let classifier = Arc::new(OpenAiClassifier::new(&config.openai)?);
    let intake = Arc::new(Intake::new(
        storage.clone(),
        classifier,
        config.telegram.allowed_users.clone(),
    ));
    Ok((storage, intake))
}
