//! Rendering of [`Answer`]s into provider wire payloads.
//!
//! The layout depends only on how many options an answer carries: none is a
//! plain text message, up to [`MAX_REPLY_BUTTONS`] become reply buttons, more
//! become a single-section list. Options missing an id or title are dropped
//! from the rendered set without affecting the layout choice.

use serde::Serialize;

use super::Provider;
use crate::answers::{Answer, AnswerOption};

pub mod cloud_api;
pub mod serpro;

/// Largest option count rendered as reply buttons.
pub const MAX_REPLY_BUTTONS: usize = 3;

/// Default label of the list-opening button and of the list section.
pub const DEFAULT_LIST_LABEL: &str = "Opções";

/// Outbound message shape, which also selects the provider endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Plain text.
    Text,
    /// Inline reply buttons.
    Buttons,
    /// Selectable list.
    List,
}

impl Layout {
    /// Choose the layout for an answer with `count` options.
    pub fn for_option_count(count: usize) -> Self {
        match count {
            0 => Self::Text,
            n if n <= MAX_REPLY_BUTTONS => Self::Buttons,
            _ => Self::List,
        }
    }
}

/// A rendered message ready to be posted to a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundPayload {
    /// Cloud API message body.
    CloudApi(cloud_api::CloudApiMessage),
    /// Serpro message body.
    Serpro(serpro::SerproMessage),
}

impl OutboundPayload {
    /// Layout of the rendered message.
    pub fn layout(&self) -> Layout {
        match self {
            Self::CloudApi(message) => message.layout(),
            Self::Serpro(message) => message.layout(),
        }
    }

    /// Provider the payload was rendered for.
    pub fn provider(&self) -> Provider {
        match self {
            Self::CloudApi(_) => Provider::CloudApi,
            Self::Serpro(_) => Provider::Serpro,
        }
    }
}

/// Labels used by list messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLabels {
    /// Text of the button that opens the list (Cloud API only).
    pub button: String,
    /// Title of the single list section.
    pub section_title: String,
}

impl Default for ListLabels {
    fn default() -> Self {
        Self {
            button: DEFAULT_LIST_LABEL.to_owned(),
            section_title: DEFAULT_LIST_LABEL.to_owned(),
        }
    }
}

/// Renders answers for one provider.
#[derive(Debug, Clone)]
pub struct Translator {
    provider: Provider,
    waba_id: String,
    labels: ListLabels,
}

impl Translator {
    /// Translator for Cloud API payloads.
    pub fn cloud_api(labels: ListLabels) -> Self {
        Self {
            provider: Provider::CloudApi,
            waba_id: String::new(),
            labels,
        }
    }

    /// Translator for Serpro payloads sent from the given WhatsApp Business account.
    pub fn serpro(waba_id: String, labels: ListLabels) -> Self {
        Self {
            provider: Provider::Serpro,
            waba_id,
            labels,
        }
    }

    /// Provider this translator renders for.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Render one answer addressed to `to`.
    pub fn render(&self, answer: &Answer, to: &str) -> OutboundPayload {
        let layout = Layout::for_option_count(answer.options.len());
        match self.provider {
            Provider::CloudApi => {
                OutboundPayload::CloudApi(cloud_api::render(answer, to, layout, &self.labels))
            }
            Provider::Serpro => OutboundPayload::Serpro(serpro::render(
                answer,
                to,
                &self.waba_id,
                layout,
                &self.labels,
            )),
        }
    }

    /// Render a whole answer sequence, preserving order.
    pub fn render_all(&self, answers: &[Answer], to: &str) -> Vec<OutboundPayload> {
        answers.iter().map(|answer| self.render(answer, to)).collect()
    }
}

/// Options that have both an id and a title, in their original order.
fn renderable_options<'a>(
    options: &'a [AnswerOption],
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    options.iter().filter_map(AnswerOption::renderable)
}
