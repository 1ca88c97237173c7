// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema synchronizer with a content-hash migration ledger.
//!
//! The canonical schema is one embedded SQL file. `sync_schema` hashes it,
//! checks the `schema_migrations` ledger for that hash, and only executes
//! the DDL when the hash is absent. The ledger row is written after all
//! statements succeed, so a crash mid-sequence re-runs the whole file on
//! the next call -- the schema statements are idempotent by construction
//! to make that safe.

use gastobot_core::GastobotError;
use rusqlite::params;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::database::{map_tr_err, Database};

/// Canonical schema definition, embedded at build time.
pub const SCHEMA_SQL: &str = include_str!("../schema.sql");

/// Ensure the store's schema matches the embedded definition.
///
/// Idempotent and safe to call on every cold start. Concurrent callers may
/// race to insert the ledger row; the loser's UNIQUE violation is treated
/// as already-applied.
pub async fn sync_schema(db: &Database) -> Result<(), GastobotError> {
    sync_schema_sql(db, SCHEMA_SQL).await
}

pub(crate) async fn sync_schema_sql(db: &Database, sql: &str) -> Result<(), GastobotError> {
    let schema_hash = hash_content(sql);

    ensure_migrations_table(db).await?;

    if has_schema_been_applied(db, &schema_hash).await? {
        debug!(hash = %schema_hash, "schema already current");
        return Ok(());
    }

    let statements = split_statements(sql);
    if statements.is_empty() {
        return Ok(());
    }

    let count = statements.len();
    db.connection()
        .call(move |conn| {
            for statement in &statements {
                conn.execute(statement, [])?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

    record_applied(db, &schema_hash).await?;
    info!(statements = count, hash = %schema_hash, "schema synchronized");
    Ok(())
}

/// Splits a schema file into individual executable statements.
///
/// Comment lines are stripped, statements end at a `;` at end of line (or
/// end of input), and blank statements are discarded.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        if line.trim_start().starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');
        if line.trim_end().ends_with(';') {
            push_statement(&mut statements, &current);
            current.clear();
        }
    }
    push_statement(&mut statements, &current);

    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let stmt = raw.trim().trim_end_matches(';').trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

async fn ensure_migrations_table(db: &Database) -> Result<(), GastobotError> {
    db.connection()
        .call(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    schema_hash TEXT NOT NULL UNIQUE,
                    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

async fn has_schema_been_applied(
    db: &Database,
    schema_hash: &str,
) -> Result<bool, GastobotError> {
    let schema_hash = schema_hash.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT 1 FROM schema_migrations WHERE schema_hash = ?1 LIMIT 1")?;
            let found = stmt.exists(params![schema_hash])?;
            Ok(found)
        })
        .await
        .map_err(map_tr_err)
}

async fn record_applied(db: &Database, schema_hash: &str) -> Result<(), GastobotError> {
    let hash = schema_hash.to_string();
    let result = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO schema_migrations (schema_hash) VALUES (?1)",
                params![hash],
            )?;
            Ok(())
        })
        .await;

    match result {
        Ok(()) => Ok(()),
        // A concurrent instance recorded the same hash first; the schema is
        // current either way.
        Err(tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(e, _)))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            debug!(hash = %schema_hash, "ledger row already present, treating as applied");
            Ok(())
        }
        Err(e) => Err(map_tr_err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_db(name: &str) -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(name);
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn ledger_rows(db: &Database) -> i64 {
        db.connection()
            .call(|conn| {
                let count =
                    conn.query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                        row.get::<_, i64>(0)
                    })?;
                Ok::<_, rusqlite::Error>(count)
            })
            .await
            .unwrap()
    }

    #[test]
    fn split_strips_comments_and_blanks() {
        let sql = "-- header comment\nCREATE TABLE IF NOT EXISTS a (id TEXT);\n\n-- another\nCREATE INDEX IF NOT EXISTS i ON a (id);\n";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].starts_with("CREATE TABLE"));
        assert!(stmts[1].starts_with("CREATE INDEX"));
        assert!(!stmts[0].contains("--"));
        assert!(!stmts[0].ends_with(';'));
    }

    #[test]
    fn split_handles_multiline_statements() {
        let sql = "CREATE TABLE IF NOT EXISTS a (\n    id TEXT PRIMARY KEY,\n    body TEXT\n);";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].contains("PRIMARY KEY"));
    }

    #[test]
    fn split_handles_missing_trailing_terminator() {
        let stmts = split_statements("CREATE TABLE IF NOT EXISTS a (id TEXT)");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn split_of_comments_only_is_empty() {
        assert!(split_statements("-- nothing here\n-- at all\n").is_empty());
    }

    #[tokio::test]
    async fn sync_creates_tables_and_ledger_row() {
        let (db, _dir) = open_db("sync.db").await;
        sync_schema(&db).await.unwrap();

        let has_messages: bool = db
            .connection()
            .call(|conn| {
                let found = conn
                    .prepare(
                        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'messages'",
                    )?
                    .exists([])?;
                Ok::<_, rusqlite::Error>(found)
            })
            .await
            .unwrap();
        assert!(has_messages);
        assert_eq!(ledger_rows(&db).await, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sync_twice_is_idempotent() {
        let (db, _dir) = open_db("twice.db").await;
        sync_schema(&db).await.unwrap();
        sync_schema(&db).await.unwrap();
        assert_eq!(ledger_rows(&db).await, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn changed_schema_content_gets_its_own_ledger_row() {
        let (db, _dir) = open_db("versions.db").await;
        sync_schema_sql(&db, "CREATE TABLE IF NOT EXISTS one (id TEXT);")
            .await
            .unwrap();
        sync_schema_sql(
            &db,
            "CREATE TABLE IF NOT EXISTS one (id TEXT);\nCREATE TABLE IF NOT EXISTS two (id TEXT);",
        )
        .await
        .unwrap();
        assert_eq!(ledger_rows(&db).await, 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_ledger_insert_is_benign() {
        let (db, _dir) = open_db("race.db").await;
        ensure_migrations_table(&db).await.unwrap();
        // Simulate a concurrent instance winning the race.
        record_applied(&db, "abc123").await.unwrap();
        record_applied(&db, "abc123").await.unwrap();
        assert_eq!(ledger_rows(&db).await, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_schema_records_nothing() {
        let (db, _dir) = open_db("empty.db").await;
        sync_schema_sql(&db, "-- only comments\n").await.unwrap();
        assert_eq!(ledger_rows(&db).await, 0);
        db.close().await.unwrap();
    }
}
