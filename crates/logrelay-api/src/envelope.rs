//! Ack/nack response envelopes for the direct API.
//!
//! An ack is answered with HTTP 200 and a nack with HTTP 400, whatever the
//! failure, authentication failures included.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Request id used when the caller did not supply one.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Stable failure codes carried by a nack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NackCode {
    /// Authorization header missing or not a bearer token.
    Unauthorized,
    /// Bearer token does not match the write token.
    InvalidToken,
    /// Request body is not JSON.
    InvalidJson,
    /// Payload is missing or has unusable fields.
    InvalidField,
    /// The event could not be stored.
    DbError,
}

/// Error details inside a nack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NackPayload {
    /// Always `"error"`
    pub status: &'static str,
    /// Failure code
    pub code: NackCode,
    /// Human-readable description
    pub message: String,
}

/// Response body of the direct API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseEnvelope {
    /// The event was accepted and stored.
    Ack {
        /// Caller-supplied correlation id
        request_id: String,
    },
    /// The request failed.
    Nack {
        /// Caller-supplied correlation id, or `"unknown"`
        request_id: String,
        /// Failure details
        payload: NackPayload,
    },
}

impl ResponseEnvelope {
    /// Creates an ack for `request_id`.
    pub fn ack(request_id: impl Into<String>) -> Self {
        Self::Ack { request_id: request_id.into() }
    }

    /// Creates a nack for `request_id` with the given code and message.
    pub fn nack(request_id: impl Into<String>, code: NackCode, message: impl Into<String>) -> Self {
        Self::Nack {
            request_id: request_id.into(),
            payload: NackPayload { status: "error", code, message: message.into() },
        }
    }

    /// HTTP status this envelope is sent with.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Ack { .. } => StatusCode::OK,
            Self::Nack { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Reads the correlation id from a parsed request body.
///
/// Strings are used as-is and numbers are rendered; anything else, and an
/// empty string, falls back to `"unknown"`.
pub fn request_id_of(body: &Value) -> String {
    match body.get("request_id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => UNKNOWN_REQUEST_ID.to_string(),
    }
}

/// JSON truthiness: null, false, zero and empty strings are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
