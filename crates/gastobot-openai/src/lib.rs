// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-backed expense classifier gateway.
//!
//! Implements [`ExpenseClassifier`] over the Chat Completions API: the
//! judge instructions go in as the system message, the inbound message
//! text (plus an optional sender hint) as the user message, and the model
//! must answer with a JSON object carrying a classification and a reply.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::debug;

use gastobot_config::model::OpenAiConfig;
use gastobot_core::types::ClassifierVerdict;
use gastobot_core::{ExpenseClassifier, GastobotError};

use crate::client::OpenAiClient;
use crate::types::{ApiMessage, ChatCompletionRequest, ResponseFormat};

/// Placeholder sent to the model when the message carries no usable text.
const NO_TEXT_PLACEHOLDER: &str = "[no text provided]";

/// Instructions for the expense judge persona.
const JUDGE_INSTRUCTIONS: &str = "\
You are an expense accountability partner in a private Telegram chat.
You track expenses for an Argentine couple in his mid 30s.
They have 2 dogs. Both are entrepreneurs (keep that in mind to judge them).
Classify each incoming message as either an expense report or off-topic:
- Respond with classification \"expense\" when the message clearly describes money being spent, purchases, bills, or financial outflows.
- Respond with classification \"off_topic\" for anything else, including empty or undecipherable content.
When the classification is \"expense\", craft a short, judgmental reply (max 200 characters) that subtly shames the spender. Be concise and avoid emojis. Reply in Argentine Spanish. Be informal, use common slangs like \"boludo\", \"posta\", \"dale\". Dont use \"che\", I dont like it.
When the classification is \"off_topic\", reply with a short statement that the message is off-topic.
Use only information provided in the message text. If there is no usable text, treat it as off_topic.
Answer with a single JSON object: {\"classification\": \"expense\" | \"off_topic\", \"reply\": \"...\"}.
Just for context, 1500 ars is 1 USD. Argentina is expensive at this moment. A meal outside from home is around 15000 ARS but can cost up to 50000 ARS per person.";

/// Expense classifier backed by the OpenAI Chat Completions API.
#[derive(Debug)]
pub struct OpenAiClassifier {
    client: OpenAiClient,
    model: String,
    max_output_tokens: u32,
}

impl OpenAiClassifier {
    /// Build a classifier from configuration.
    ///
    /// The API key is required; its absence is a fatal configuration error
    /// raised here, at first use, not on every call.
    pub fn new(config: &OpenAiConfig) -> Result<Self, GastobotError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| GastobotError::Config("openai.api_key is not set".into()))?;

        Ok(Self {
            client: OpenAiClient::new(api_key)?,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, url: String) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }
}

#[async_trait]
impl ExpenseClassifier for OpenAiClassifier {
    async fn classify(
        &self,
        text: Option<&str>,
        sender: Option<&str>,
    ) -> Result<ClassifierVerdict, GastobotError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ApiMessage::system(JUDGE_INSTRUCTIONS),
                ApiMessage::user(build_prompt(text, sender)),
            ],
            max_tokens: self.max_output_tokens,
            response_format: Some(ResponseFormat::json_object()),
        };

        let response = self.client.complete_chat(&request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| GastobotError::Classifier {
                message: "model returned no output".into(),
                source: None,
            })?;

        let verdict: ClassifierVerdict =
            serde_json::from_str(content).map_err(|e| GastobotError::Classifier {
                message: format!("model output is not a valid verdict: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(classification = %verdict.classification, "message classified");
        Ok(verdict)
    }
}

/// Builds the user prompt: optional sender hint, then the message text or
/// the no-text placeholder.
fn build_prompt(text: Option<&str>, sender: Option<&str>) -> String {
    let mut lines = Vec::new();

    if let Some(sender) = sender {
        lines.push(format!("Sender username: {sender}"));
    }

    lines.push("Message:".to_string());
    let trimmed = text.map(str::trim).filter(|t| !t.is_empty());
    lines.push(trimmed.unwrap_or(NO_TEXT_PLACEHOLDER).to_string());

    lines.join("\n")
}
