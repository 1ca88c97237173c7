// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from Telegram updates to channel-agnostic messages.
//!
//! Only text and voice messages are supported; everything else maps to
//! `None` and is dropped before any side effect runs.

use gastobot_core::types::{ChatMessage, MessageContent, MessageRef};
use teloxide::types::Message;

/// Maps a Telegram message into a [`ChatMessage`], or `None` when the
/// content kind is unsupported (photos, stickers, locations, ...).
///
/// Sender identity is carried over as-is; messages without a sender
/// (channel posts) still map, with both identity fields absent, and are
/// rejected later by the allow-list.
pub fn supported_message(msg: &Message) -> Option<ChatMessage> {
    let content = extract_content(msg)?;

    let reply_to = msg.reply_to_message().map(|replied| MessageRef {
        chat_id: replied.chat.id.0,
        message_id: replied.id.0,
    });

    Some(ChatMessage {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        sender_id: msg.from.as_ref().map(|u| u.id.0 as i64),
        sender_username: msg.from.as_ref().and_then(|u| u.username.clone()),
        content,
        reply_to,
    })
}

fn extract_content(msg: &Message) -> Option<MessageContent> {
    if let Some(text) = msg.text()
        && !text.is_empty()
    {
        return Some(MessageContent::Text(text.to_string()));
    }

    if let Some(voice) = msg.voice() {
        return Some(MessageContent::Voice {
            file_id: voice.file.id.to_string(),
            caption: msg.caption().map(|c| c.to_string()),
        });
    }

    None
}
