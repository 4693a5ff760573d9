//! Answer source backed by a Rasa-style REST channel.
//!
//! Posts `{"sender": ..., "message": ...}` and expects a JSON array of bot
//! messages shaped like `{"text": ..., "buttons": [{"title", "payload"}]}`.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{Answer, AnswerError, AnswerSource};
use crate::http::sanitize_body;
use crate::whatsapp::events::{Contact, InboundMessage};

/// Answer source that forwards every actionable message to a REST channel.
#[derive(Debug, Clone)]
pub struct RestAnswerSource {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct RestRequest<'a> {
    sender: &'a str,
    message: &'a str,
}

impl RestAnswerSource {
    /// Create a source posting to `url`.
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl AnswerSource for RestAnswerSource {
    async fn answers(
        &self,
        message: &InboundMessage,
        contact: &Contact,
    ) -> Result<Vec<Answer>, AnswerError> {
        let text = message.selection_text();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let request = RestRequest {
            sender: &contact.phone,
            message: text,
        };
        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AnswerError::Status {
                status: status.as_u16(),
                body: sanitize_body(&body),
            });
        }

        let answers: Vec<Answer> =
            serde_json::from_str(&body).map_err(|e| AnswerError::Parse(e.to_string()))?;
        debug!(count = answers.len(), "answers received from REST channel");
        Ok(answers)
    }
}
