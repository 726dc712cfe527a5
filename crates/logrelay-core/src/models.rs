//! Log event model and payload validation.
//!
//! A `LogEvent` is built once from an inbound JSON payload, validated, and
//! never mutated afterwards. Validation follows truthiness rules for the
//! string fields and presence rules for `level`, so `level: 0` is accepted
//! while an empty `service` is not.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

/// Field names every payload must carry, in storage column order.
pub const REQUIRED_FIELDS: [&str; 4] = ["service", "instance", "level", "message"];

/// Lowest severity that triggers a chat notification.
pub const ALERT_LEVEL: i64 = 3;

/// A single structured log line accepted for persistence.
///
/// # Example
///
/// ```
/// use logrelay_core::LogEvent;
/// use serde_json::json;
///
/// let event = LogEvent::from_payload(&json!({
///     "service": "billing",
///     "instance": "billing-7f9c",
///     "level": 0,
///     "message": "worker started",
/// }))
/// .unwrap();
///
/// assert_eq!(event.level, 0);
/// assert!(!event.is_alert());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEvent {
    /// Identifier of the emitting service
    pub service: String,
    /// Identifier of the emitting instance of that service
    pub instance: String,
    /// Severity, 0 being the lowest
    pub level: i64,
    /// Free-form log message
    pub message: String,
}

impl LogEvent {
    /// Validates a JSON payload and builds an event from it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidField` if the payload is not an object or a
    /// field has the wrong JSON type, and `CoreError::MissingField` if any
    /// string field is absent or empty or `level` is absent.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let fields = payload
            .as_object()
            .ok_or(CoreError::InvalidField { field: "payload", reason: "expected an object" })?;

        let service = text_field(fields, "service")?;
        let instance = text_field(fields, "instance")?;
        let level = level_field(fields)?;
        let message = text_field(fields, "message")?;

        match (service, instance, level, message) {
            (Some(service), Some(instance), Some(level), Some(message)) => {
                Ok(Self { service, instance, level, message })
            },
            (service, instance, level, message) => {
                let present =
                    [service.is_some(), instance.is_some(), level.is_some(), message.is_some()];
                let missing = REQUIRED_FIELDS
                    .iter()
                    .zip(present)
                    .filter(|(_, present)| !present)
                    .map(|(name, _)| *name)
                    .collect();
                Err(CoreError::MissingField { missing })
            },
        }
    }

    /// Returns whether this event is severe enough to notify about.
    pub const fn is_alert(&self) -> bool {
        self.level >= ALERT_LEVEL
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}/{}: {}", self.level, self.service, self.instance, self.message)
    }
}

/// Reads a string field, treating absent, null and empty values as missing.
fn text_field(fields: &Map<String, Value>, name: &'static str) -> Result<Option<String>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(CoreError::InvalidField { field: name, reason: "expected a string" }),
    }
}

/// Reads `level`, where only absence counts as missing.
fn level_field(fields: &Map<String, Value>) -> Result<Option<i64>> {
    match fields.get("level") {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or(CoreError::InvalidField { field: "level", reason: "expected an integer" }),
    }
}
