//! Integration tests for the Telegram transport.
//!
//! Runs the transport against a local mock Bot API and checks request shape
//! and error categorisation.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use logrelay_core::LogEvent;
use logrelay_notify::{
    ChatTarget, ChatTransport, ClientConfig, Notifier, NotifyError, SendOutcome, TelegramTransport,
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn transport_for(server: &MockServer) -> TelegramTransport {
    TelegramTransport::new(ClientConfig { api_base: server.uri(), ..ClientConfig::default() })
        .expect("Failed to create transport")
}

fn target() -> ChatTarget {
    ChatTarget::from_parts(Some("4242:secret".to_string()), Some("-100777".to_string()))
        .expect("target")
}

#[tokio::test]
async fn posts_chat_id_and_text_to_send_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot4242:secret/sendMessage"))
        .and(body_json(json!({ "chat_id": "-100777", "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);

    transport.send_message(&target(), "hello").await.expect("send should succeed");
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden: bot was kicked"))
        .mount(&server)
        .await;

    let transport = transport_for(&server);

    match transport.send_message(&target(), "hello").await {
        Err(NotifyError::Rejected { status_code, body }) => {
            assert_eq!(status_code, 403);
            assert!(body.contains("bot was kicked"));
        },
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_api_is_network_error_without_token() {
    let transport = TelegramTransport::new(ClientConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        ..ClientConfig::default()
    })
    .unwrap();

    match transport.send_message(&target(), "hello").await {
        Err(NotifyError::Network { message }) => assert!(!message.contains("secret")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn notifier_sends_formatted_event_through_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot4242:secret/sendMessage"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let notifier = Notifier::new(Arc::new(transport_for(&server)), Some(target()));
    let event = LogEvent {
        service: "queue".to_string(),
        instance: "queue-0".to_string(),
        level: 3,
        message: "backlog above threshold".to_string(),
    };

    notifier.notify_event(&event).await;

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["text"].as_str().unwrap().contains("Service: queue"));
    assert_eq!(notifier.send("ping").await.unwrap(), SendOutcome::Sent);
}
