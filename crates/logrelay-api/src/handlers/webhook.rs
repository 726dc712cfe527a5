//! Pub/sub webhook ingestion handler.
//!
//! A webhook delivers a batch of messages whose `data` field is itself a JSON
//! string wrapping `{"payload": {...}}`. Every message is handled on its own:
//! a bad message is skipped or reported to the operator chat, never allowed
//! to fail the batch. The sender only ever sees a flat plain-text status.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::{auth, envelope::is_truthy, pipeline::Pipeline, AppState};

/// Request id every webhook-originated event is ingested under.
///
/// Kept byte-for-byte as downstream log matching expects it.
pub const WEBHOOK_REQUEST_ID: &str = "unknow";

/// Result of handling one message of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageOutcome {
    /// The payload was validated and stored.
    Persisted,
    /// The message had no usable `data`.
    SkippedNoData,
    /// `data` decoded but carried no object `payload`.
    SkippedBadPayload,
    /// `data` was not a decodable JSON string.
    FailedParse,
    /// The pipeline rejected the payload or could not store it.
    FailedPersist,
}

/// Per-batch tally of message outcomes, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One outcome per message, in the order they were processed
    pub outcomes: Vec<MessageOutcome>,
}

impl BatchReport {
    /// Number of messages that ended with `outcome`.
    pub fn count(&self, outcome: MessageOutcome) -> usize {
        self.outcomes.iter().filter(|o| **o == outcome).count()
    }

    fn summary(&self) -> BTreeMap<MessageOutcome, usize> {
        let mut summary = BTreeMap::new();
        for outcome in &self.outcomes {
            *summary.entry(*outcome).or_insert(0) += 1;
        }
        summary
    }
}

/// Ingests a webhook batch.
///
/// Answers `401 Unauthorized` on a bad `X-Ably-Auth` header, `400` when the
/// body is not JSON or has no message array, and `200 OK` once every message
/// has been handled, whatever their individual outcomes.
#[instrument(name = "ingest_webhook", skip_all, fields(body_len = body.len()))]
pub async fn ingest_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorized = auth::webhook_secret(&headers).is_some_and(|provided| {
        auth::secret_matches(state.credentials.webhook_secret.as_deref(), provided)
    });
    if !authorized {
        warn!("Webhook rejected: bad or missing shared secret");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let notifier = state.pipeline.notifier();

    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Webhook body is not valid JSON");
            notifier.notify_error(&format!("Webhook received invalid JSON: {e}")).await;
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        },
    };

    let Some(messages) = batch_messages(&body) else {
        warn!("Webhook body has no items or messages array");
        notifier.notify_error("Webhook received invalid format: no items or messages array").await;
        return (StatusCode::BAD_REQUEST, "Invalid webhook format").into_response();
    };

    let report = process_batch(&state.pipeline, messages).await;
    info!(
        messages = report.outcomes.len(),
        persisted = report.count(MessageOutcome::Persisted),
        outcomes = ?report.summary(),
        "Webhook batch processed"
    );

    (StatusCode::OK, "OK").into_response()
}

/// Finds the message array, preferring `items` over `messages`.
///
/// A truthy `items` that is not an array makes the batch invalid even when
/// `messages` is one.
pub fn batch_messages(body: &Value) -> Option<&[Value]> {
    body.get("items")
        .filter(|items| is_truthy(items))
        .or_else(|| body.get("messages"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// Handles every message in order and reports what happened to each.
pub async fn process_batch(pipeline: &Pipeline, messages: &[Value]) -> BatchReport {
    let mut report = BatchReport { outcomes: Vec::with_capacity(messages.len()) };

    for (index, message) in messages.iter().enumerate() {
        let outcome = process_message(pipeline, message).await;
        debug!(index, ?outcome, "Webhook message handled");
        report.outcomes.push(outcome);
    }

    report
}

/// Handles a single webhook message.
pub async fn process_message(pipeline: &Pipeline, message: &Value) -> MessageOutcome {
    let Some(data) = message.get("data").filter(|data| is_truthy(data)) else {
        return MessageOutcome::SkippedNoData;
    };

    let decoded = match data {
        Value::String(encoded) => serde_json::from_str::<Value>(encoded).map_err(|e| e.to_string()),
        _ => Err("data is not a JSON-encoded string".to_string()),
    };
    let decoded = match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "Webhook message data could not be decoded");
            pipeline
                .notifier()
                .notify_error(&format!("Failed to parse webhook message data: {e}"))
                .await;
            return MessageOutcome::FailedParse;
        },
    };

    let Some(payload) = decoded.get("payload").filter(|payload| payload.is_object()) else {
        return MessageOutcome::SkippedBadPayload;
    };

    match pipeline.ingest(WEBHOOK_REQUEST_ID, payload).await {
        Ok(_) => MessageOutcome::Persisted,
        Err(e) => {
            error!(error = %e, "Webhook message ingestion failed");
            let notifier = pipeline.notifier();
            notifier.notify_error(&format!("Failed to ingest webhook message: {e}")).await;
            notifier.notify_error(&format!("Webhook processing failed: {e}")).await;
            MessageOutcome::FailedPersist
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn items_are_preferred_over_messages() {
        let body = json!({ "items": [{ "data": "a" }], "messages": [{}, {}] });

        assert_eq!(batch_messages(&body).map(<[Value]>::len), Some(1));
    }

    #[test]
    fn messages_are_used_without_items() {
        let body = json!({ "messages": [{}, {}] });
        assert_eq!(batch_messages(&body).map(<[Value]>::len), Some(2));

        let body = json!({ "items": null, "messages": [{}] });
        assert_eq!(batch_messages(&body).map(<[Value]>::len), Some(1));
    }

    #[test]
    fn non_array_batches_are_invalid() {
        assert!(batch_messages(&json!({ "items": "nope", "messages": [{}] })).is_none());
        assert!(batch_messages(&json!({ "messages": { "data": "x" } })).is_none());
        assert!(batch_messages(&json!({})).is_none());
        assert!(batch_messages(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn report_counts_outcomes() {
        let report = BatchReport {
            outcomes: vec![
                MessageOutcome::Persisted,
                MessageOutcome::FailedParse,
                MessageOutcome::Persisted,
            ],
        };

        assert_eq!(report.count(MessageOutcome::Persisted), 2);
        assert_eq!(report.count(MessageOutcome::FailedParse), 1);
        assert_eq!(report.count(MessageOutcome::SkippedNoData), 0);
        assert_eq!(report.summary().len(), 2);
    }
}
