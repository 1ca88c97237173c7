// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up the webhook route and shared state for the push transport.

use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tokio::sync::OnceCell;

use gastobot_agent::Intake;
use gastobot_config::model::GatewayConfig;
use gastobot_core::GastobotError;
use gastobot_storage::SqliteStorage;
use gastobot_telegram::WEBHOOK_PATH;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Intake orchestrator both transports share.
    pub intake: Arc<Intake>,
    /// SQLite storage, lazily brought up to date on first use.
    pub storage: Arc<SqliteStorage>,
    /// Tracks whether the schema has been synced this process.
    schema_sync: Arc<OnceCell<()>>,
    /// Shared secret Telegram echoes back on each webhook call. `None`
    /// disables the check.
    pub webhook_secret: Option<String>,
}

impl GatewayState {
    pub fn new(
        intake: Arc<Intake>,
        storage: Arc<SqliteStorage>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            intake,
            storage,
            schema_sync: Arc::new(OnceCell::new()),
            webhook_secret,
        }
    }

    /// Opens the database and syncs the schema, once per process. A failed
    /// attempt leaves the cell empty so the next request retries.
    pub async fn ensure_schema(&self) -> Result<(), GastobotError> {
        self.schema_sync
            .get_or_try_init(|| async {
                self.storage.initialize().await?;
                self.storage.sync_schema().await
            })
            .await?;
        Ok(())
    }
}

/// Builds the gateway router. Split out from [`start_server`] so tests can
/// drive it without binding a socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(handlers::telegram_webhook))
        .with_state(state)
}

/// Starts the gateway HTTP server on the configured host and port. Serves
/// until the process is stopped.
pub async fn start_server(config: &GatewayConfig, state: GatewayState) -> Result<(), GastobotError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GastobotError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| GastobotError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
