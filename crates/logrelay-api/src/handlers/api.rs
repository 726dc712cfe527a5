//! Direct API ingestion handler.
//!
//! Checks run in a fixed order and each failure short-circuits the rest:
//! bearer header shape, token value, JSON body, payload presence, then the
//! pipeline itself. Every failure is a nack with HTTP 400.

use axum::{extract::State, http::HeaderMap};
use bytes::Bytes;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::{
    auth,
    envelope::{is_truthy, request_id_of, NackCode, ResponseEnvelope, UNKNOWN_REQUEST_ID},
    AppState,
};

/// Ingests a single log event sent by a direct API caller.
///
/// Expects `Authorization: Bearer <token>` and a body of the form
/// `{"request_id"?: string, "payload": {service, instance, level, message}}`.
#[instrument(name = "ingest_api", skip_all, fields(body_len = body.len()))]
pub async fn ingest_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ResponseEnvelope {
    let Some(token) = auth::bearer_token(&headers) else {
        warn!("Missing or malformed Authorization header");
        return ResponseEnvelope::nack(
            UNKNOWN_REQUEST_ID,
            NackCode::Unauthorized,
            "Missing or malformed Authorization header",
        );
    };

    if !auth::secret_matches(state.credentials.write_token.as_deref(), token) {
        warn!("Invalid write token");
        return ResponseEnvelope::nack(UNKNOWN_REQUEST_ID, NackCode::InvalidToken, "Invalid token");
    }

    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Request body is not valid JSON");
            return ResponseEnvelope::nack(
                UNKNOWN_REQUEST_ID,
                NackCode::InvalidJson,
                format!("Invalid JSON: {e}"),
            );
        },
    };

    let request_id = request_id_of(&body);

    let payload = body.get("payload").filter(|payload| is_truthy(payload));
    let Some(payload) = payload.filter(|p| p.get("message").is_some_and(is_truthy)) else {
        warn!(request_id = %request_id, "Request lacks payload or payload.message");
        return ResponseEnvelope::nack(
            request_id,
            NackCode::InvalidField,
            "Missing payload or payload.message",
        );
    };

    match state.pipeline.ingest(&request_id, payload).await {
        Ok(ack) => {
            info!(request_id = %request_id, "Log event acknowledged");
            ack.into()
        },
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Direct ingestion failed");
            state
                .pipeline
                .notifier()
                .notify_error(&format!("API ingestion failed for request {request_id}: {e}"))
                .await;
            ResponseEnvelope::nack(request_id, e.nack_code(), e.to_string())
        },
    }
}
