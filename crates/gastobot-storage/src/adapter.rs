// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`MessageStore`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use gastobot_config::model::StorageConfig;
use gastobot_core::types::StoredMessage;
use gastobot_core::{GastobotError, MessageStore};

use crate::database::Database;
use crate::{queries, schema};

/// SQLite-backed message store.
///
/// Wraps a [`Database`] handle and delegates query operations to the typed
/// query modules. The database is lazily initialized on the first call to
/// [`SqliteStorage::initialize`] and shared read-only for the rest of the
/// process lifetime.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: SqliteStorage::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database. Idempotent under concurrent first use.
    pub async fn initialize(&self) -> Result<(), GastobotError> {
        self.db
            .get_or_try_init(|| Database::open(&self.config.database_path))
            .await?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Bring the schema up to date via the migration ledger.
    pub async fn sync_schema(&self) -> Result<(), GastobotError> {
        schema::sync_schema(self.db()?).await
    }

    /// Checkpoint and release the database.
    pub async fn close(&self) -> Result<(), GastobotError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }

    /// Look up a stored message by record id (used by tests and diagnostics).
    pub async fn get_message(&self, id: &str) -> Result<Option<StoredMessage>, GastobotError> {
        queries::messages::get_message(self.db()?, id).await
    }

    /// Total number of stored messages.
    pub async fn count_messages(&self) -> Result<i64, GastobotError> {
        queries::messages::count_messages(self.db()?).await
    }

    fn db(&self) -> Result<&Database, GastobotError> {
        self.db.get().ok_or_else(|| GastobotError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl MessageStore for SqliteStorage {
    async fn upsert_message(&self, message: &StoredMessage) -> Result<(), GastobotError> {
        queries::messages::upsert_message(self.db()?, message).await
    }
}
