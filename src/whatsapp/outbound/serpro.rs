//! Serpro message bodies.
//!
//! Every body carries the recipient, the message text and the WhatsApp
//! Business account id; the remaining fields depend on the endpoint.

use serde::Serialize;

use super::{renderable_options, Layout, ListLabels};
use crate::answers::Answer;

/// Body of the Serpro text, buttons, and list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerproMessage {
    /// Recipient phone.
    pub destinatario: String,
    /// Message text.
    #[serde(rename = "textoBody")]
    pub texto_body: String,
    /// WhatsApp Business account id.
    #[serde(rename = "wabaId")]
    pub waba_id: String,
    /// Endpoint-specific fields.
    #[serde(flatten)]
    pub content: SerproContent,
}

impl SerproMessage {
    /// Layout of this message.
    pub fn layout(&self) -> Layout {
        match self.content {
            SerproContent::Text { .. } => Layout::Text,
            SerproContent::Buttons { .. } => Layout::Buttons,
            SerproContent::List { .. } => Layout::List,
        }
    }
}

/// Endpoint-specific part of a Serpro body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SerproContent {
    /// Plain text.
    Text {
        /// Message text.
        body: String,
        /// Whether links get a preview; always `false`.
        preview_url: bool,
    },
    /// Reply buttons.
    Buttons {
        /// Buttons in option order.
        buttons: Vec<SerproButton>,
    },
    /// Single-section list.
    List {
        /// List sections; always exactly one.
        secoes: Vec<Secao>,
    },
}

/// One reply button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerproButton {
    /// Button id.
    pub id: String,
    /// Button label.
    pub titulo: String,
}

/// One list section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Secao {
    /// Section heading.
    pub titulo: String,
    /// Rows in option order.
    pub rows: Vec<SerproRow>,
}

/// One selectable list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerproRow {
    /// Row id.
    pub id: String,
    /// Row label.
    pub titulo: String,
    /// Row description; always empty.
    pub descricao: String,
}

pub(super) fn render(
    answer: &Answer,
    to: &str,
    waba_id: &str,
    layout: Layout,
    labels: &ListLabels,
) -> SerproMessage {
    let content = match layout {
        Layout::Text => SerproContent::Text {
            body: answer.text.clone(),
            preview_url: false,
        },
        Layout::Buttons => SerproContent::Buttons {
            buttons: renderable_options(&answer.options)
                .map(|(id, title)| SerproButton {
                    id: id.to_owned(),
                    titulo: title.to_owned(),
                })
                .collect(),
        },
        Layout::List => SerproContent::List {
            secoes: vec![Secao {
                titulo: labels.section_title.clone(),
                rows: renderable_options(&answer.options)
                    .map(|(id, title)| SerproRow {
                        id: id.to_owned(),
                        titulo: title.to_owned(),
                        descricao: String::new(),
                    })
                    .collect(),
            }],
        },
    };

    SerproMessage {
        destinatario: to.to_owned(),
        texto_body: answer.text.clone(),
        waba_id: waba_id.to_owned(),
        content,
    }
}
