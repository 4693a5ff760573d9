//! Cloud API (`graph.facebook.com`) message bodies.

use serde::Serialize;

use super::{renderable_options, Layout, ListLabels};
use crate::answers::Answer;

const MESSAGING_PRODUCT: &str = "whatsapp";
const RECIPIENT_TYPE: &str = "individual";
const REPLY_BUTTON_TYPE: &str = "reply";

/// Body of `POST /{phone_number_id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudApiMessage {
    /// Always `"whatsapp"`.
    pub messaging_product: &'static str,
    /// Always `"individual"`.
    pub recipient_type: &'static str,
    /// Recipient phone.
    pub to: String,
    /// Text or interactive content, tagged by `type`.
    #[serde(flatten)]
    pub content: CloudApiContent,
}

impl CloudApiMessage {
    /// Layout of this message.
    pub fn layout(&self) -> Layout {
        match &self.content {
            CloudApiContent::Text { .. } => Layout::Text,
            CloudApiContent::Interactive {
                interactive: Interactive::Button { .. },
            } => Layout::Buttons,
            CloudApiContent::Interactive {
                interactive: Interactive::List { .. },
            } => Layout::List,
        }
    }
}

/// Message content; serialized with a `type` of `"text"` or `"interactive"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CloudApiContent {
    /// Plain text.
    Text {
        /// Text body.
        text: TextBody,
    },
    /// Buttons or list.
    Interactive {
        /// Interactive object.
        interactive: Interactive,
    },
}

/// `text` object of a plain message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBody {
    /// Message text.
    pub body: String,
    /// Whether links get a preview; always `false`.
    pub preview_url: bool,
}

/// `interactive` object, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Interactive {
    /// Reply buttons.
    Button {
        /// Message text.
        body: InteractiveBody,
        /// Buttons.
        action: ButtonAction,
    },
    /// Single-section list.
    List {
        /// Message text.
        body: InteractiveBody,
        /// Button label and sections.
        action: ListAction,
    },
}

/// `body` of an interactive message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveBody {
    /// Message text.
    pub text: String,
}

/// `action` of a button message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonAction {
    /// Reply buttons in option order.
    pub buttons: Vec<ReplyButton>,
}

/// One reply button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyButton {
    /// Always `"reply"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Button id and title.
    pub reply: Reply,
}

/// Id and title of a reply button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    /// Id echoed back in `button_reply.id`.
    pub id: String,
    /// Button label.
    pub title: String,
}

/// `action` of a list message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListAction {
    /// Label of the button that opens the list.
    pub button: String,
    /// List sections; always exactly one.
    pub sections: Vec<Section>,
}

/// One list section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Section heading.
    pub title: String,
    /// Rows in option order.
    pub rows: Vec<Row>,
}

/// One selectable list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Id echoed back in `list_reply.id`.
    pub id: String,
    /// Row label.
    pub title: String,
    /// Row description; always empty.
    pub description: String,
}

/// Render `answer` for `to` with the given layout.
pub(super) fn render(answer: &Answer, to: &str, layout: Layout, labels: &ListLabels) -> CloudApiMessage {
    let content = match layout {
        Layout::Text => CloudApiContent::Text {
            text: TextBody {
                body: answer.text.clone(),
                preview_url: false,
            },
        },
        Layout::Buttons => CloudApiContent::Interactive {
            interactive: Interactive::Button {
                body: InteractiveBody {
                    text: answer.text.clone(),
                },
                action: ButtonAction {
                    buttons: renderable_options(&answer.options)
                        .map(|(id, title)| ReplyButton {
                            kind: REPLY_BUTTON_TYPE,
                            reply: Reply {
                                id: id.to_owned(),
                                title: title.to_owned(),
                            },
                        })
                        .collect(),
                },
            },
        },
        Layout::List => CloudApiContent::Interactive {
            interactive: Interactive::List {
                body: InteractiveBody {
                    text: answer.text.clone(),
                },
                action: ListAction {
                    button: labels.button.clone(),
                    sections: vec![Section {
                        title: labels.section_title.clone(),
                        rows: renderable_options(&answer.options)
                            .map(|(id, title)| Row {
                                id: id.to_owned(),
                                title: title.to_owned(),
                                description: String::new(),
                            })
                            .collect(),
                    }],
                },
            },
        },
    };

    CloudApiMessage {
        messaging_product: MESSAGING_PRODUCT,
        recipient_type: RECIPIENT_TYPE,
        to: to.to_owned(),
        content,
    }
}
