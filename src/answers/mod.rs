//! Abstract replies and the sources that produce them.
//!
//! An [`Answer`] is provider-agnostic: text plus an ordered list of options.
//! The [`AnswerSource`] trait is the seam to whatever decides what to say;
//! [`CannedAnswers`] replays a fixed script and [`rest::RestAnswerSource`]
//! asks a Rasa-style REST channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::whatsapp::events::{Contact, InboundMessage};

pub mod rest;

/// One selectable choice offered to the user.
///
/// Both fields are optional on the wire; options missing either one are
/// dropped when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Value sent back when the option is selected (Rasa calls it `payload`).
    #[serde(default, alias = "payload")]
    pub id: Option<String>,
    /// Label shown to the user.
    #[serde(default)]
    pub title: Option<String>,
}

impl AnswerOption {
    /// Build an option with both fields present.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
        }
    }

    /// The `(id, title)` pair when both are present and non-empty.
    pub fn renderable(&self) -> Option<(&str, &str)> {
        let id = self.id.as_deref().filter(|id| !id.is_empty())?;
        let title = self.title.as_deref().filter(|title| !title.is_empty())?;
        Some((id, title))
    }
}

/// One reply unit, independent of any wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// Ordered options; empty for a plain text reply.
    #[serde(default, alias = "buttons")]
    pub options: Vec<AnswerOption>,
}

impl Answer {
    /// A plain text answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// An answer offering the given options.
    pub fn with_options(text: impl Into<String>, options: Vec<AnswerOption>) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }
}

/// Errors from answer sources.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    /// HTTP request to the answer backend failed.
    #[error("answer backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The answer backend responded with a non-success status.
    #[error("answer backend returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },

    /// The answer backend response did not match the expected shape.
    #[error("answer backend response parse error: {0}")]
    Parse(String),
}

/// Decides what to reply to an inbound message.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    /// Produce the replies for `message`, in send order.
    ///
    /// Implementations return an empty list when
    /// [`InboundMessage::selection_text`] is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AnswerError`] when the backend cannot be reached or answers
    /// with something unreadable.
    async fn answers(
        &self,
        message: &InboundMessage,
        contact: &Contact,
    ) -> Result<Vec<Answer>, AnswerError>;
}

/// Replays a fixed list of answers to every actionable message.
#[derive(Debug, Clone, Default)]
pub struct CannedAnswers {
    answers: Vec<Answer>,
}

impl CannedAnswers {
    /// Create a source that always replies with `answers`.
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers }
    }
}

#[async_trait]
impl AnswerSource for CannedAnswers {
    async fn answers(
        &self,
        message: &InboundMessage,
        _contact: &Contact,
    ) -> Result<Vec<Answer>, AnswerError> {
        if message.selection_text().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.answers.clone())
    }
}
