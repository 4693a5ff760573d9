//! Inbound webhook events.
//!
//! A [`WhatsAppEvent`] wraps one raw envelope together with the [`Provider`]
//! detected for it, and exposes the normalized [`InboundMessage`] and
//! [`Contact`]. Malformed or unexpected envelopes never fail: they degrade to
//! [`InboundMessage::Unsupported`] and a default contact.

use serde_json::Value;
use tracing::debug;

use super::phone::normalize_phone;
use super::Provider;

/// Display name used when the envelope carries no contact profile.
pub const DEFAULT_CONTACT_NAME: &str = "Participante";

/// A user message extracted from a webhook envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Free text typed by the user.
    Text {
        /// Message body.
        body: String,
    },
    /// The user tapped a reply button.
    ButtonReply {
        /// Id of the selected button.
        selected_id: String,
    },
    /// The user picked a row from a list message.
    ListReply {
        /// Id of the selected row.
        selected_id: String,
    },
    /// Anything without actionable text (media, reactions, status updates).
    Unsupported,
}

impl InboundMessage {
    /// Text to hand to the answer source; empty for [`InboundMessage::Unsupported`].
    pub fn selection_text(&self) -> &str {
        match self {
            Self::Text { body } => body,
            Self::ButtonReply { selected_id } | Self::ListReply { selected_id } => selected_id,
            Self::Unsupported => "",
        }
    }

    /// Build a message from one raw entry of the provider's `messages` list.
    pub fn from_raw(raw: &Value) -> Self {
        let kind = MessageKind::parse(raw.get("type").and_then(Value::as_str));
        let message = match kind {
            MessageKind::Interactive => raw.get("interactive").and_then(interactive_reply),
            MessageKind::Text => raw
                .get("text")
                .and_then(|text| text.get("body"))
                .and_then(Value::as_str)
                .map(|body| Self::Text {
                    body: body.to_owned(),
                }),
            MessageKind::Other => None,
        };
        message.unwrap_or(Self::Unsupported)
    }
}

/// Message `type` values the adapter knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// `"interactive"`: a button or list reply.
    Interactive,
    /// `"text"`: a typed message.
    Text,
    /// Any other or missing type.
    Other,
}

impl MessageKind {
    /// Parse the raw `type` field.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("interactive") => Self::Interactive,
            Some("text") => Self::Text,
            _ => Self::Other,
        }
    }
}

/// Read an interactive reply.
///
/// Envelopes with an `interactive.type` discriminator select between
/// `button_reply` and `list_reply`. Envelopes without one always carry a
/// `button_reply`.
fn interactive_reply(interactive: &Value) -> Option<InboundMessage> {
    match interactive.get("type").and_then(Value::as_str) {
        Some("button_reply") | None => {
            reply_id(interactive, "button_reply").map(|selected_id| InboundMessage::ButtonReply {
                selected_id,
            })
        }
        Some("list_reply") => {
            reply_id(interactive, "list_reply").map(|selected_id| InboundMessage::ListReply {
                selected_id,
            })
        }
        Some(other) => {
            debug!(interactive_type = other, "unsupported interactive reply");
            None
        }
    }
}

fn reply_id(interactive: &Value, key: &str) -> Option<String> {
    match interactive.get(key)?.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// The sender of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Profile name, or [`DEFAULT_CONTACT_NAME`].
    pub name: String,
    /// Normalized `+`-prefixed phone, or empty when unknown.
    pub phone: String,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            name: DEFAULT_CONTACT_NAME.to_owned(),
            phone: String::new(),
        }
    }
}

impl Contact {
    /// Build a contact from the provider's raw `contacts` list.
    ///
    /// Only the first entry is read. A missing list, an empty list, or missing
    /// fields leave the corresponding defaults in place.
    pub fn from_contacts(contacts: Option<&Value>) -> Self {
        let mut contact = Self::default();
        let Some(first) = contacts.and_then(|list| list.get(0)) else {
            return contact;
        };

        if let Some(wa_id) = first.get("wa_id").and_then(Value::as_str) {
            contact.phone = normalize_phone(wa_id);
        }
        if let Some(name) = first
            .get("profile")
            .and_then(|profile| profile.get("name"))
            .and_then(Value::as_str)
        {
            contact.name = name.to_owned();
        }
        contact
    }
}

/// One inbound webhook delivery bound to the provider it came from.
#[derive(Debug, Clone)]
pub struct WhatsAppEvent {
    provider: Provider,
    envelope: Value,
}

impl WhatsAppEvent {
    /// Wrap an envelope, detecting its provider once.
    pub fn new(envelope: Value) -> Self {
        let provider = Provider::detect(&envelope);
        Self { provider, envelope }
    }

    /// Provider the envelope was detected as.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Read a field using the provider's envelope layout.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.provider.event_field(&self.envelope, key)
    }

    /// The first message of the event, or [`InboundMessage::Unsupported`].
    pub fn message(&self) -> InboundMessage {
        self.field("messages")
            .and_then(|messages| messages.get(0))
            .map(InboundMessage::from_raw)
            .unwrap_or(InboundMessage::Unsupported)
    }

    /// The sender of the event.
    pub fn contact(&self) -> Contact {
        Contact::from_contacts(self.field("contacts"))
    }
}
