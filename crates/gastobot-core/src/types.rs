// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Gastobot crates.
//!
//! The unit of work is [`ChatMessage`]: a transport-agnostic view of one
//! inbound Telegram message carrying exactly one supported content kind.
//! [`StoredMessage`] is its durable form, keyed by the deterministic
//! `<chat_id>:<message_id>` record id that makes redelivery idempotent.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Composite reference to a message within a chat.
///
/// `record_id()` is the persistence key: globally unique and deterministic,
/// so redelivered updates overwrite rather than duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

impl MessageRef {
    pub fn record_id(&self) -> String {
        format!("{}:{}", self.chat_id, self.message_id)
    }
}

/// Supported message content. Exactly two kinds; anything else is dropped
/// before a `ChatMessage` is ever constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text message body (non-empty).
    Text(String),
    /// Voice note with its opaque Telegram file reference and optional caption.
    Voice {
        file_id: String,
        caption: Option<String>,
    },
}

impl MessageContent {
    /// The usable text of this content: the body for text messages, the
    /// caption (if any) for voice messages.
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::Voice { caption, .. } => caption.as_deref(),
        }
    }
}

/// One inbound chat message after transport mapping.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub sender_id: Option<i64>,
    pub sender_username: Option<String>,
    pub content: MessageContent,
    pub reply_to: Option<MessageRef>,
}

impl ChatMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }
}

/// Durable message kind discriminator, stored as `TEXT` / `VOICE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum MessageType {
    #[strum(serialize = "TEXT")]
    #[serde(rename = "TEXT")]
    Text,
    #[strum(serialize = "VOICE")]
    #[serde(rename = "VOICE")]
    Voice,
}

/// Durable form of a [`ChatMessage`], as written to the messages table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: String,
    pub sender_id: String,
    pub message_type: MessageType,
    pub text: Option<String>,
    pub media_url: Option<String>,
    pub reply_to_message_id: Option<String>,
}

impl StoredMessage {
    /// Maps a chat message into its durable form.
    ///
    /// Returns `None` when the message has no resolvable sender, in which
    /// case nothing is persisted (matching the upsert contract).
    pub fn from_chat(msg: &ChatMessage) -> Option<Self> {
        let sender_id = msg.sender_id?;
        let reply_to_message_id = msg.reply_to.map(|r| r.record_id());

        let (message_type, text, media_url) = match &msg.content {
            MessageContent::Text(text) => (MessageType::Text, Some(text.clone()), None),
            MessageContent::Voice { file_id, caption } => {
                (MessageType::Voice, caption.clone(), Some(file_id.clone()))
            }
        };

        Some(Self {
            id: msg.message_ref().record_id(),
            sender_id: sender_id.to_string(),
            message_type,
            text,
            media_url,
            reply_to_message_id,
        })
    }
}

/// Classification returned by the expense classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Classification {
    #[serde(rename = "expense")]
    #[strum(serialize = "expense")]
    Expense,
    #[serde(rename = "off_topic")]
    #[strum(serialize = "off_topic")]
    OffTopic,
}

/// The classifier's verdict for one message: a classification plus the
/// reply text to send back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub classification: Classification,
    pub reply: String,
}

/// A reply instruction addressed to the originating chat.
///
/// The push transport serializes this as Telegram's inline webhook answer
/// (`{"method":"sendMessage",...}`); the pull transport performs the send
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub chat_id: i64,
    pub text: String,
}
