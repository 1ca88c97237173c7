// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gastobot - an expense-tracking Telegram bot with an LLM judge.
//!
//! This is the binary entry point. The same bot runs behind two
//! interchangeable transports: `serve` long polls the Telegram API and
//! `gateway` receives webhook calls over HTTP.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod bootstrap;
mod gateway;
mod serve;
mod webhook;

use clap::{Parser, Subcommand};

/// Gastobot - an expense-tracking Telegram bot with an LLM judge.
#[derive(Parser, Debug)]
#[command(name = "gastobot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot on the pull transport (Telegram long polling).
    Serve,
    /// Run the bot on the push transport (HTTP webhook server).
    Gateway,
    /// Register the webhook URL with Telegram and exit.
    SetWebhook,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match gastobot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            gastobot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run_serve(config).await,
        Some(Commands::Gateway) => gateway::run_gateway(config).await,
        Some(Commands::SetWebhook) => webhook::run_set_webhook(config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured `agent.log_level`
/// applies to gastobot crates and `warn` to everything else.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gastobot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = gastobot_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "gastobot");
    }
}
