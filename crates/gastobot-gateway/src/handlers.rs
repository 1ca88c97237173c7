// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook request handler for the push transport.
//!
//! Telegram POSTs one update per request. The contract is narrow: 403 on a
//! bad secret, 400 on an unparseable body, 500 when the schema cannot be
//! brought up to date, and 200 otherwise -- either a bare acknowledgement
//! or a `sendMessage` instruction Telegram executes on our behalf. A 200
//! is the only way to stop Telegram from redelivering the update.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use teloxide::types::{Update, UpdateKind};
use tracing::{debug, error, warn};

use gastobot_telegram::handler::supported_message;

use crate::server::GatewayState;

/// Header Telegram echoes the configured secret back in.
const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// POST /api/telegram-webhook
pub async fn telegram_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let presented = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected) {
            warn!("rejecting webhook call with missing or mismatched secret token");
            return (StatusCode::FORBIDDEN, Json(json!({ "ok": false }))).into_response();
        }
    }

    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(v) if v.is_object() => {}
        _ => {
            warn!("rejecting webhook call with unparseable body");
            return (StatusCode::BAD_REQUEST, Json(json!({ "ok": false }))).into_response();
        }
    }

    if let Err(e) = state.ensure_schema().await {
        error!(error = %e, "schema sync failed, cannot process update");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false })),
        )
            .into_response();
    }

    // Shapes this bot does not handle are acknowledged, not rejected, so
    // Telegram stops redelivering them.
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            debug!(error = %e, "acknowledging unrecognized update shape");
            return (StatusCode::OK, Json(json!({ "ok": true }))).into_response();
        }
    };

    let inbound = match &update.kind {
        UpdateKind::Message(msg) => supported_message(msg),
        _ => None,
    };

    let Some(inbound) = inbound else {
        return (StatusCode::OK, Json(json!({ "ok": true }))).into_response();
    };

    match state.intake.handle_message(inbound).await {
        Some(reply) => (
            StatusCode::OK,
            Json(json!({
                "method": "sendMessage",
                "chat_id": reply.chat_id,
                "text": reply.text,
            })),
        )
            .into_response(),
        None => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use gastobot_agent::Intake;
    use gastobot_config::model::StorageConfig;
    use gastobot_core::types::{Classification, ClassifierVerdict};
    use gastobot_core::{ExpenseClassifier, GastobotError};
    use gastobot_storage::SqliteStorage;

    use crate::server::{router, GatewayState};

    struct FixedClassifier;

    #[async_trait]
    impl ExpenseClassifier for FixedClassifier {
        async fn classify(
            &self,
            _text: Option<&str>,
            _sender: Option<&str>,
        ) -> Result<ClassifierVerdict, GastobotError> {
            Ok(ClassifierVerdict {
                classification: Classification::Expense,
                reply: "20 lucas al super, posta?".into(),
            })
        }
    }

    fn state_for(db_path: &str, secret: Option<&str>) -> GatewayState {
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string(),
        }));
        let intake = Arc::new(Intake::new(
            storage.clone(),
            Arc::new(FixedClassifier),
            vec!["viarnes".into(), "besosyjoyas".into()],
        ));
        GatewayState::new(intake, storage, secret.map(str::to_string))
    }

    fn update_json(username: &str, text: &str) -> String {
        serde_json::json!({
            "update_id": 900001,
            "message": {
                "message_id": 42,
                "date": 1700000000i64,
                "chat": { "id": 777, "type": "private", "first_name": "Test" },
                "from": {
                    "id": 1001,
                    "is_bot": false,
                    "first_name": "Test",
                    "username": username,
                },
                "text": text,
            },
        })
        .to_string()
    }

    fn webhook_request(body: &str, secret: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/telegram-webhook")
            .header("content-type", "application/json");
        if let Some(secret) = secret {
            builder = builder.header("x-telegram-bot-api-secret-token", secret);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn get_is_method_not_allowed_with_allow_header() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_for(dir.path().join("t.db").to_str().unwrap(), None));

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/telegram-webhook")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let allow = response.headers().get("allow").unwrap().to_str().unwrap();
        assert!(allow.contains("POST"), "Allow header was {allow:?}");
    }

    #[tokio::test]
    async fn missing_or_wrong_secret_is_forbidden() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_for(
            dir.path().join("t.db").to_str().unwrap(),
            Some("s3cr3t"),
        ));

        let response = app
            .clone()
            .oneshot(webhook_request(&update_json("viarnes", "hola"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await, serde_json::json!({ "ok": false }));

        let response = app
            .oneshot(webhook_request(
                &update_json("viarnes", "hola"),
                Some("wrong"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unparseable_body_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_for(dir.path().join("t.db").to_str().unwrap(), None));

        let response = app
            .clone()
            .oneshot(webhook_request("this is not json", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Valid JSON but not an object is still a bad body.
        let response = app.oneshot(webhook_request("[1,2,3]", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, serde_json::json!({ "ok": false }));
    }

    #[tokio::test]
    async fn allowed_user_gets_send_message_instruction_and_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("t.db");
        let state = state_for(db_path.to_str().unwrap(), Some("s3cr3t"));
        let storage = state.storage.clone();
        let app = router(state);

        let response = app
            .oneshot(webhook_request(
                &update_json("besosyjoyas", "Pagué 20000 ars por el super"),
                Some("s3cr3t"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["method"], "sendMessage");
        assert_eq!(body["chat_id"], 777);
        assert_eq!(body["text"], "20 lucas al super, posta?");

        let stored = storage.get_message("777:42").await.unwrap().unwrap();
        assert_eq!(stored.text.as_deref(), Some("Pagué 20000 ars por el super"));
    }

    #[tokio::test]
    async fn stranger_is_acknowledged_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path().join("t.db").to_str().unwrap(), None);
        let storage = state.storage.clone();
        let app = router(state);

        let response = app
            .oneshot(webhook_request(&update_json("stranger", "hola"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "ok": true }));
        assert_eq!(storage.count_messages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn redelivered_update_is_stored_once() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path().join("t.db").to_str().unwrap(), None);
        let storage = state.storage.clone();
        let app = router(state);

        let update = update_json("viarnes", "gasté 5000 en el kiosco");
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(webhook_request(&update, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(storage.count_messages().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_without_message_is_acknowledged() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state_for(dir.path().join("t.db").to_str().unwrap(), None));

        let response = app
            .oneshot(webhook_request(r#"{"update_id": 900002}"#, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn schema_failure_is_internal_error() {
        // Point the database at a directory that does not exist.
        let app = router(state_for("/nonexistent-gastobot-dir/t.db", None));

        let response = app
            .oneshot(webhook_request(&update_json("viarnes", "hola"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, serde_json::json!({ "ok": false }));
    }
}
