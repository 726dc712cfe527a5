//! Shared ingestion pipeline: validate, persist, then notify.
//!
//! Both entry points call `Pipeline::ingest`. Persistence is the only step
//! that decides success; the notification for severe events runs after the
//! insert and its outcome is ignored.

use std::sync::Arc;

use logrelay_core::{CoreError, LogEvent, LogStore};
use logrelay_notify::Notifier;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::envelope::{NackCode, ResponseEnvelope};

/// Successful ingestion of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Correlation id the event was ingested under
    pub request_id: String,
}

impl From<Ack> for ResponseEnvelope {
    fn from(ack: Ack) -> Self {
        Self::ack(ack.request_id)
    }
}

/// Why an event was not ingested.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// The payload is not a valid log event.
    #[error(transparent)]
    Validation(CoreError),

    /// The event is valid but could not be stored.
    #[error(transparent)]
    Persistence(CoreError),
}

impl PipelineError {
    /// Nack code reported to direct API callers.
    pub const fn nack_code(&self) -> NackCode {
        match self {
            Self::Validation(_) => NackCode::InvalidField,
            Self::Persistence(_) => NackCode::DbError,
        }
    }
}

/// Validation, persistence and notification for single events.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn LogStore>,
    notifier: Notifier,
}

impl Pipeline {
    /// Creates a pipeline over the given store and notifier.
    pub fn new(store: Arc<dyn LogStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Returns the notifier, also used for operator error reports.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Ingests one payload under `request_id`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Validation` when the payload is not a valid
    /// event and `PipelineError::Persistence` when the insert fails. Nothing
    /// is stored or sent in either case.
    #[instrument(name = "ingest", skip(self, payload))]
    pub async fn ingest(&self, request_id: &str, payload: &Value) -> Result<Ack, PipelineError> {
        let event = LogEvent::from_payload(payload).map_err(PipelineError::Validation)?;

        self.store.append(&event).await.map_err(PipelineError::Persistence)?;
        info!(
            service = %event.service,
            instance = %event.instance,
            level = event.level,
            "Log event stored"
        );

        if event.is_alert() {
            debug!(level = event.level, "Severe event, notifying");
            self.notifier.notify_event(&event).await;
        }

        Ok(Ack { request_id: request_id.to_string() })
    }
}
