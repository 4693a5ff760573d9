//! Canned answer source.

use wabridge::answers::{Answer, AnswerSource, CannedAnswers};
use wabridge::whatsapp::events::{Contact, InboundMessage};

#[tokio::test]
async fn replays_script_for_text() {
    let script = vec![Answer::text("um"), Answer::text("dois")];
    let source = CannedAnswers::new(script.clone());
    let message = InboundMessage::Text {
        body: "oi".to_owned(),
    };

    let answers = source
        .answers(&message, &Contact::default())
        .await
        .expect("canned answers never fail");

    assert_eq!(answers, script);
}

#[tokio::test]
async fn replays_script_for_button_reply() {
    let source = CannedAnswers::new(vec![Answer::text("obrigado")]);
    let message = InboundMessage::ButtonReply {
        selected_id: "1".to_owned(),
    };

    let answers = source
        .answers(&message, &Contact::default())
        .await
        .expect("canned answers never fail");

    assert_eq!(answers.len(), 1);
}

#[tokio::test]
async fn unsupported_message_gets_no_answers() {
    let source = CannedAnswers::new(vec![Answer::text("um")]);

    let answers = source
        .answers(&InboundMessage::Unsupported, &Contact::default())
        .await
        .expect("canned answers never fail");

    assert!(answers.is_empty());
}
