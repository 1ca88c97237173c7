// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gastobot serve` command implementation.
//!
//! Runs the pull transport: opens storage, syncs the schema, then long
//! polls Telegram until interrupted.

use gastobot_config::GastobotConfig;
use gastobot_core::GastobotError;
use tracing::info;

use crate::bootstrap;

pub async fn run_serve(config: GastobotConfig) -> Result<(), GastobotError> {
    info!("starting gastobot serve (long polling)");

    let (storage, intake) = bootstrap::build_intake(&config)?;
    storage.initialize().await?;
    storage.sync_schema().await?;

    let bot = gastobot_telegram::new_bot(&config.telegram)?;
    let result = gastobot_telegram::run_polling(bot, intake).await;

    storage.close().await?;
    info!("gastobot serve stopped");
    result
}
