// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message upsert and lookup.

use std::str::FromStr;

use gastobot_core::types::{MessageType, StoredMessage};
use gastobot_core::GastobotError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Upsert a message by its record id.
///
/// Insert if absent, else overwrite every mapped field with the new values
/// (last write wins). Redelivering an identical update results in the same
/// stored row, never a duplicate or a constraint violation.
pub async fn upsert_message(db: &Database, msg: &StoredMessage) -> Result<(), GastobotError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (
                    id,
                    sender_id,
                    message_type,
                    text,
                    media_url,
                    reply_to_message_id
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    sender_id = excluded.sender_id,
                    message_type = excluded.message_type,
                    text = excluded.text,
                    media_url = excluded.media_url,
                    reply_to_message_id = excluded.reply_to_message_id",
                params![
                    msg.id,
                    msg.sender_id,
                    msg.message_type.to_string(),
                    msg.text,
                    msg.media_url,
                    msg.reply_to_message_id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a stored message by record id.
pub async fn get_message(
    db: &Database,
    id: &str,
) -> Result<Option<StoredMessage>, GastobotError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, sender_id, message_type, text, media_url, reply_to_message_id
                     FROM messages WHERE id = ?1",
                    params![id],
                    |row| {
                        let message_type: String = row.get(2)?;
                        Ok(StoredMessage {
                            id: row.get(0)?,
                            sender_id: row.get(1)?,
                            message_type: MessageType::from_str(&message_type).map_err(|_| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    2,
                                    rusqlite::types::Type::Text,
                                    format!("unknown message_type `{message_type}`").into(),
                                )
                            })?,
                            text: row.get(3)?,
                            media_url: row.get(4)?,
                            reply_to_message_id: row.get(5)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
        .await
        .map_err(map_tr_err)
}

/// Total number of stored messages.
pub async fn count_messages(db: &Database) -> Result<i64, GastobotError> {
    db.connection()
        .call(|conn| {
            let count =
                conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}
