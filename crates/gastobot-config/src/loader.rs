// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./gastobot.toml` >
//! `~/.config/gastobot/gastobot.toml` > `/etc/gastobot/gastobot.toml`
//! with environment variable overrides via the `GASTOBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::GastobotConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/gastobot/gastobot.toml` (system-wide)
/// 3. `~/.config/gastobot/gastobot.toml` (user XDG config)
/// 4. `./gastobot.toml` (local directory)
/// 5. `GASTOBOT_*` environment variables
pub fn load_config() -> Result<GastobotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GastobotConfig::default()))
        .merge(Toml::file("/etc/gastobot/gastobot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("gastobot/gastobot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("gastobot.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<GastobotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GastobotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GastobotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GastobotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `GASTOBOT_TELEGRAM_BOT_TOKEN` must map
/// to `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("GASTOBOT_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: GASTOBOT_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
