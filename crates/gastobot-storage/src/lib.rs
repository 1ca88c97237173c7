// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Gastobot expense bot.
//!
//! Provides WAL-mode SQLite storage via `tokio-rusqlite`'s single-writer
//! model, a content-hash-ledgered schema synchronizer, and the keyed
//! message upsert that makes redelivery idempotent.

pub mod adapter;
pub mod database;
pub mod queries;
pub mod schema;

pub use adapter::SqliteStorage;
pub use database::Database;
