//! REST answer source against a fake Rasa channel.

use wabridge::answers::rest::RestAnswerSource;
use wabridge::answers::{AnswerError, AnswerOption, AnswerSource};
use wabridge::whatsapp::events::{Contact, InboundMessage};

use crate::support::FakeServer;

fn maria() -> Contact {
    Contact {
        name: "Maria".to_owned(),
        phone: "+5561981178174".to_owned(),
    }
}

fn source(server: &FakeServer) -> RestAnswerSource {
    RestAnswerSource::new(
        reqwest::Client::new(),
        server.url("/webhooks/rest/webhook"),
    )
}

#[tokio::test]
async fn posts_sender_and_message() {
    let server = FakeServer::start(vec![(
        200,
        r#"[
            {"recipient_id": "+5561981178174", "text": "Olá!"},
            {"recipient_id": "+5561981178174", "text": "Concorda?",
             "buttons": [{"title": "Sim", "payload": "1"}, {"title": "Não", "payload": "-1"}]}
        ]"#,
    )])
    .await;

    let message = InboundMessage::ButtonReply {
        selected_id: "1".to_owned(),
    };
    let answers = source(&server)
        .answers(&message, &maria())
        .await
        .expect("answers should parse");

    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].text, "Olá!");
    assert!(answers[0].options.is_empty());
    assert_eq!(
        answers[1].options,
        vec![AnswerOption::new("1", "Sim"), AnswerOption::new("-1", "Não")]
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/webhooks/rest/webhook");
    assert_eq!(
        requests[0].json(),
        serde_json::json!({ "sender": "+5561981178174", "message": "1" })
    );
}

#[tokio::test]
async fn unsupported_message_skips_backend() {
    let server = FakeServer::start(Vec::new()).await;

    let answers = source(&server)
        .answers(&InboundMessage::Unsupported, &maria())
        .await
        .expect("should succeed without a request");

    assert!(answers.is_empty());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = FakeServer::start(vec![(500, "rasa exploded")]).await;
    let message = InboundMessage::Text {
        body: "oi".to_owned(),
    };

    let result = source(&server).answers(&message, &maria()).await;

    match result {
        Err(AnswerError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "rasa exploded");
        }
        other => panic!("expected status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let server = FakeServer::start(vec![(200, r#"{"not": "a list"}"#)]).await;
    let message = InboundMessage::Text {
        body: "oi".to_owned(),
    };

    let result = source(&server).answers(&message, &maria()).await;

    assert!(matches!(result, Err(AnswerError::Parse(_))));
}
