// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intake orchestrator: the single coordinator both transports drive.
//!
//! Per message: filter -> persist (failures logged and swallowed) ->
//! classify (failures fall back to a fixed acknowledgement) -> exactly one
//! reply to the originating chat. Stateless and transport-agnostic, so the
//! push and pull deployments are functionally identical. No retries: each
//! side effect is attempted exactly once per update.

use std::sync::Arc;

use tracing::{debug, error};

use gastobot_core::types::{ChatMessage, OutboundReply, StoredMessage};
use gastobot_core::{ExpenseClassifier, MessageStore};

use crate::filter;

/// Reply used when the classifier fails or returns an empty reply. The
/// sender always gets some acknowledgement.
pub const FALLBACK_ACKNOWLEDGEMENT: &str = "Message received";

/// The intake orchestrator. Cheap to clone via `Arc` and shared by both
/// transport adapters.
pub struct Intake {
    store: Arc<dyn MessageStore>,
    classifier: Arc<dyn ExpenseClassifier>,
    allowed_users: Vec<String>,
}

impl Intake {
    pub fn new(
        store: Arc<dyn MessageStore>,
        classifier: Arc<dyn ExpenseClassifier>,
        allowed_users: Vec<String>,
    ) -> Self {
        Self {
            store,
            classifier,
            allowed_users,
        }
    }

    /// Handle one inbound message end to end.
    ///
    /// Returns `None` for out-of-scope messages (a silent drop, not an
    /// error); otherwise exactly one reply instruction.
    pub async fn handle_message(&self, msg: ChatMessage) -> Option<OutboundReply> {
        if !filter::is_in_scope(&msg, &self.allowed_users) {
            debug!(chat_id = msg.chat_id, "dropping out-of-scope message");
            return None;
        }

        self.persist(&msg).await;

        let text = self.build_reply_text(&msg).await;
        Some(OutboundReply {
            chat_id: msg.chat_id,
            text,
        })
    }

    /// Persist the message. Failures are logged and swallowed: a storage
    /// outage must never block the reply path.
    async fn persist(&self, msg: &ChatMessage) {
        let Some(stored) = StoredMessage::from_chat(msg) else {
            return;
        };
        if let Err(e) = self.store.upsert_message(&stored).await {
            error!(error = %e, id = %stored.id, "failed to store message");
        }
    }

    /// Resolve the reply text: the classifier's reply, trimmed, or the
    /// fallback acknowledgement when the classifier fails or returns
    /// nothing usable.
    async fn build_reply_text(&self, msg: &ChatMessage) -> String {
        let result = self
            .classifier
            .classify(msg.content.text(), msg.sender_username.as_deref())
            .await;

        match result {
            Ok(verdict) => {
                let trimmed = verdict.reply.trim();
                if trimmed.is_empty() {
                    FALLBACK_ACKNOWLEDGEMENT.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(e) => {
                error!(error = %e, "failed to generate classifier response");
                FALLBACK_ACKNOWLEDGEMENT.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gastobot_core::types::{
        Classification, ClassifierVerdict, MessageContent, MessageRef,
    };
    use gastobot_core::GastobotError;
    use std::sync::Mutex;

    /// In-memory store recording every upsert; optionally fails.
    struct RecordingStore {
        rows: Mutex<Vec<StoredMessage>>,
        fail: bool,
    }

    impl RecordingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn rows(&self) -> Vec<StoredMessage> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageStore for RecordingStore {
        async fn upsert_message(&self, message: &StoredMessage) -> Result<(), GastobotError> {
            if self.fail {
                return Err(GastobotError::Storage {
                    source: "store is down".into(),
                });
            }
            self.rows.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    /// Classifier returning a queued verdict, an error, or recording calls.
    struct MockClassifier {
        verdict: Option<ClassifierVerdict>,
        calls: Mutex<Vec<Option<String>>>,
    }

    impl MockClassifier {
        fn replying(classification: Classification, reply: &str) -> Arc<Self> {
            Arc::new(Self {
                verdict: Some(ClassifierVerdict {
                    classification,
                    reply: reply.to_string(),
                }),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                verdict: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Option<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExpenseClassifier for MockClassifier {
        async fn classify(
            &self,
            text: Option<&str>,
            _sender: Option<&str>,
        ) -> Result<ClassifierVerdict, GastobotError> {
            self.calls.lock().unwrap().push(text.map(str::to_string));
            self.verdict.clone().ok_or_else(|| GastobotError::Classifier {
                message: "service unreachable".into(),
                source: None,
            })
        }
    }

    fn allowed() -> Vec<String> {
        vec!["viarnes".into(), "besosyjoyas".into()]
    }

    fn text_message(username: &str, text: &str) -> ChatMessage {
        ChatMessage {
            chat_id: 777,
            message_id: 42,
            sender_id: Some(1001),
            sender_username: Some(username.into()),
            content: MessageContent::Text(text.into()),
            reply_to: None,
        }
    }

    #[tokio::test]
    async fn in_scope_text_message_is_stored_classified_and_replied() {
        let store = RecordingStore::new();
        let classifier =
            MockClassifier::replying(Classification::Expense, "20 lucas al super, posta?");
        let intake = Intake::new(store.clone(), classifier.clone(), allowed());

        let reply = intake
            .handle_message(text_message("besosyjoyas", "Pagué 20000 ars por el super"))
            .await
            .unwrap();

        assert_eq!(reply.chat_id, 777);
        assert_eq!(reply.text, "20 lucas al super, posta?");

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "777:42");
        assert_eq!(rows[0].text.as_deref(), Some("Pagué 20000 ars por el super"));
        assert_eq!(
            classifier.calls(),
            vec![Some("Pagué 20000 ars por el super".to_string())]
        );
    }

    #[tokio::test]
    async fn out_of_scope_message_has_no_side_effects() {
        let store = RecordingStore::new();
        let classifier = MockClassifier::replying(Classification::Expense, "nope");
        let intake = Intake::new(store.clone(), classifier.clone(), allowed());

        let reply = intake
            .handle_message(text_message("stranger", "Pagué 20000 ars"))
            .await;

        assert!(reply.is_none());
        assert!(store.rows().is_empty());
        assert!(classifier.calls().is_empty());
    }

    #[tokio::test]
    async fn classifier_failure_falls_back_to_acknowledgement() {
        let store = RecordingStore::new();
        let intake = Intake::new(store.clone(), MockClassifier::failing(), allowed());

        let reply = intake
            .handle_message(text_message("viarnes", "hola"))
            .await
            .unwrap();

        assert_eq!(reply.text, FALLBACK_ACKNOWLEDGEMENT);
        // Persistence still happened.
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn whitespace_reply_falls_back_to_acknowledgement() {
        let classifier = MockClassifier::replying(Classification::OffTopic, "   \n  ");
        let intake = Intake::new(RecordingStore::new(), classifier, allowed());

        let reply = intake
            .handle_message(text_message("viarnes", "hola"))
            .await
            .unwrap();
        assert_eq!(reply.text, FALLBACK_ACKNOWLEDGEMENT);
    }

    #[tokio::test]
    async fn reply_is_trimmed() {
        let classifier = MockClassifier::replying(Classification::Expense, "  dale, anotado  ");
        let intake = Intake::new(RecordingStore::new(), classifier, allowed());

        let reply = intake
            .handle_message(text_message("viarnes", "gasté 5000"))
            .await
            .unwrap();
        assert_eq!(reply.text, "dale, anotado");
    }

    #[tokio::test]
    async fn persistence_failure_never_blocks_the_reply() {
        let classifier = MockClassifier::replying(Classification::Expense, "igual te juzgo");
        let intake = Intake::new(RecordingStore::failing(), classifier.clone(), allowed());

        let reply = intake
            .handle_message(text_message("besosyjoyas", "gasté todo"))
            .await
            .unwrap();

        assert_eq!(reply.text, "igual te juzgo");
        assert_eq!(classifier.calls().len(), 1);
    }

    #[tokio::test]
    async fn voice_without_caption_classifies_with_no_text() {
        let store = RecordingStore::new();
        let classifier = MockClassifier::replying(Classification::OffTopic, "Eso no es un gasto.");
        let intake = Intake::new(store.clone(), classifier.clone(), allowed());

        let msg = ChatMessage {
            chat_id: 777,
            message_id: 43,
            sender_id: Some(1001),
            sender_username: Some("viarnes".into()),
            content: MessageContent::Voice {
                file_id: "AwACAgQ".into(),
                caption: None,
            },
            reply_to: Some(MessageRef {
                chat_id: 777,
                message_id: 42,
            }),
        };
        let reply = intake.handle_message(msg).await.unwrap();
        assert_eq!(reply.text, "Eso no es un gasto.");

        let rows = store.rows();
        assert_eq!(rows[0].media_url.as_deref(), Some("AwACAgQ"));
        assert!(rows[0].text.is_none());
        assert_eq!(rows[0].reply_to_message_id.as_deref(), Some("777:42"));
        assert_eq!(classifier.calls(), vec![None]);
    }

    #[tokio::test]
    async fn missing_sender_id_skips_persistence_but_still_replies() {
        let store = RecordingStore::new();
        let classifier = MockClassifier::replying(Classification::OffTopic, "ok");
        let intake = Intake::new(store.clone(), classifier, allowed());

        let mut msg = text_message("viarnes", "hola");
        msg.sender_id = None;
        let reply = intake.handle_message(msg).await;

        assert!(reply.is_some());
        assert!(store.rows().is_empty());
    }
}
