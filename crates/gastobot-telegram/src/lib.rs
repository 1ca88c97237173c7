// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport adapters for Gastobot.
//!
//! Two ways into the same intake orchestrator: long polling (the pull
//! transport, run in-process via teloxide's dispatcher) and webhook
//! registration for the push transport served by the gateway. Switching
//! transports changes delivery only, never behavior.

pub mod handler;

use std::sync::Arc;

use gastobot_agent::Intake;
use gastobot_config::model::TelegramConfig;
use gastobot_core::GastobotError;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use url::Url;
use tracing::{debug, error, info};

/// Path the gateway serves the webhook on; appended to the deployment URL
/// when no explicit webhook URL is configured.
pub const WEBHOOK_PATH: &str = "/api/telegram-webhook";

/// Builds a [`Bot`] from configuration.
///
/// Requires `telegram.bot_token` to be set and non-empty.
pub fn new_bot(config: &TelegramConfig) -> Result<Bot, GastobotError> {
    let token = config
        .bot_token
        .as_deref()
        .ok_or_else(|| GastobotError::Config("telegram.bot_token is required".into()))?;

    if token.is_empty() {
        return Err(GastobotError::Config(
            "telegram.bot_token cannot be empty".into(),
        ));
    }

    Ok(Bot::new(token))
}

/// Runs the pull transport: deletes any registered webhook (the two
/// transports are mutually exclusive on Telegram's side), then long polls
/// and feeds every supported message through the intake orchestrator.
///
/// Blocks until the dispatcher stops (ctrl-c).
pub async fn run_polling(bot: Bot, intake: Arc<Intake>) -> Result<(), GastobotError> {
    bot.delete_webhook()
        .drop_pending_updates(true)
        .await
        .map_err(|e| GastobotError::Channel {
            message: format!("failed to delete webhook before polling: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("starting Telegram long polling");

    let endpoint = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let intake = intake.clone();
        async move {
            let Some(inbound) = handler::supported_message(&msg) else {
                debug!(msg_id = msg.id.0, "ignoring unsupported message type");
                return respond(());
            };

            if let Some(reply) = intake.handle_message(inbound).await
                && let Err(e) = bot.send_message(ChatId(reply.chat_id), &reply.text).await
            {
                error!(error = %e, chat_id = reply.chat_id, "failed to send reply");
            }

            respond(())
        }
    });

    Dispatcher::builder(bot, endpoint)
        .default_handler(|_| async {}) // Silently ignore non-message updates
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Resolves the public webhook URL: the explicit `telegram.webhook_url`
/// wins; otherwise it is derived from `telegram.deployment_url` plus the
/// fixed webhook path.
pub fn resolve_webhook_url(config: &TelegramConfig) -> Result<String, GastobotError> {
    if let Some(url) = config.webhook_url.as_deref().filter(|u| !u.is_empty()) {
        return Ok(url.to_string());
    }

    let host = config
        .deployment_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            GastobotError::Config(
                "telegram.webhook_url or telegram.deployment_url is required to register a webhook"
                    .into(),
            )
        })?;

    let host = host.trim_end_matches('/');
    if host.starts_with("https://") {
        Ok(format!("{host}{WEBHOOK_PATH}"))
    } else {
        Ok(format!("https://{host}{WEBHOOK_PATH}"))
    }
}

/// Registers the push transport's webhook with Telegram, attaching the
/// shared secret when one is configured.
pub async fn register_webhook(bot: &Bot, config: &TelegramConfig) -> Result<String, GastobotError> {
    let url_str = resolve_webhook_url(config)?;
    let url = Url::parse(&url_str)
        .map_err(|e| GastobotError::Config(format!("invalid webhook URL {url_str:?}: {e}")))?;

    let mut request = bot.set_webhook(url).drop_pending_updates(true);
    if let Some(secret) = config.webhook_secret.as_deref().filter(|s| !s.is_empty()) {
        request = request.secret_token(secret.to_string());
    }

    request.await.map_err(|e| GastobotError::Channel {
        message: format!("failed to register webhook: {e}"),
        source: Some(Box::new(e)),
    })?;

    info!(url = %url_str, "webhook registered");
    Ok(url_str)
}
