// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gastobot set-webhook` command implementation.
//!
//! One-shot: resolves the public webhook URL, registers it with Telegram
//! (attaching the shared secret when configured), and exits.

use gastobot_config::GastobotConfig;
use gastobot_core::GastobotError;

pub async fn run_set_webhook(config: GastobotConfig) -> Result<(), GastobotError> {
    let bot = gastobot_telegram::new_bot(&config.telegram)?;
    let url = gastobot_telegram::register_webhook(&bot, &config.telegram).await?;
    println!("webhook registered: {url}");
    Ok(())
}
