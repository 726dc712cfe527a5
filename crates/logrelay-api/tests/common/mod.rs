//! Shared test fixtures for driving the router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    Router,
};
use logrelay_api::{create_router, AppState, Credentials, Pipeline};
use logrelay_core::storage::mock::MockLogStore;
use logrelay_notify::{mock::MockTransport, ChatTarget, Notifier};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const WRITE_TOKEN: &str = "write-token-for-tests";
pub const WEBHOOK_SECRET: &str = "ably-secret-for-tests";
pub const CHAT_ID: &str = "-100200300";

/// Router wired to in-memory storage and chat transport.
pub struct TestApp {
    pub router: Router,
    pub store: MockLogStore,
    pub transport: MockTransport,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MockLogStore::new();
        let transport = MockTransport::new();
        let target = ChatTarget::from_parts(Some("42:bot".to_string()), Some(CHAT_ID.to_string()));
        let notifier = Notifier::new(Arc::new(transport.clone()), target);
        let pipeline = Pipeline::new(Arc::new(store.clone()), notifier);
        let state =
            AppState::new(Credentials::new(Some(WRITE_TOKEN), Some(WEBHOOK_SECRET)), pipeline);

        Self { router: create_router(state), store, transport }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.expect("request execution");
        let status = response.status();
        let body =
            axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body extraction");
        (status, String::from_utf8(body.to_vec()).expect("utf-8 body"))
    }

    pub async fn post_api(&self, token: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(body.into())
            .expect("request build");

        let (status, body) = self.send(request).await;
        (status, serde_json::from_str(&body).expect("json envelope"))
    }

    pub async fn post_webhook(&self, secret: &str, body: impl Into<Body>) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/ably")
            .header("x-ably-auth", secret)
            .header("content-type", "application/json")
            .body(body.into())
            .expect("request build");

        self.send(request).await
    }

    pub async fn notifications(&self) -> Vec<String> {
        self.transport.sent_messages().await.into_iter().map(|m| m.text).collect()
    }
}

pub fn log_payload(level: i64, message: &str) -> Value {
    json!({
        "service": "billing",
        "instance": "billing-7f9c",
        "level": level,
        "message": message,
    })
}

pub fn api_body(request_id: &str, payload: Value) -> String {
    json!({ "request_id": request_id, "payload": payload }).to_string()
}

/// Wraps a payload the way the pub/sub service encodes message data.
pub fn webhook_message(payload: Value) -> Value {
    json!({ "data": json!({ "payload": payload }).to_string() })
}
