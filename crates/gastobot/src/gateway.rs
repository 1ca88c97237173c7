// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gastobot gateway` command implementation.
//!
//! Runs the push transport: an HTTP server Telegram delivers webhook
//! calls to. Storage stays closed until the first update arrives.

use gastobot_config::GastobotConfig;
use gastobot_core::GastobotError;
use gastobot_gateway::GatewayState;
use tracing::info;

use crate::bootstrap;

pub async fn run_gateway(config: GastobotConfig) -> Result<(), GastobotError> {
    info!("starting gastobot gateway (webhook)");

    let (storage, intake) = bootstrap::build_intake(&config)?;
    let state = GatewayState::new(intake, storage, config.telegram.webhook_secret.clone());

    gastobot_gateway::start_server(&config.gateway, state).await
}
