//! HTTP request handlers.
//!
//! - `api`: authenticated direct ingestion answering with ack/nack JSON
//! - `webhook`: pub/sub webhook batches answering with plain text
//!
//! Requests reach these handlers only after the router has rejected every
//! non-POST method.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub mod api;
pub mod webhook;

pub use api::ingest_api;
pub use webhook::ingest_webhook;

/// Fallback for POST requests to unknown paths.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
