//! Error types for notification delivery.

use thiserror::Error;

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Failures of a single chat message send.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// Network-level failure reaching the chat API.
    #[error("network connection failed: {message}")]
    Network {
        /// Error message describing the network failure
        message: String,
    },

    /// The chat API answered with a non-success status.
    #[error("chat API rejected message: HTTP {status_code}")]
    Rejected {
        /// HTTP status code returned by the chat API
        status_code: u16,
        /// Response body content
        body: String,
    },

    /// The HTTP client could not be built.
    #[error("invalid notification configuration: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },
}

impl NotifyError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a rejection error from a response status and body.
    pub fn rejected(status_code: u16, body: impl Into<String>) -> Self {
        Self::Rejected { status_code, body: body.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_includes_status() {
        let err = NotifyError::rejected(403, "bot was kicked");

        assert_eq!(err.to_string(), "chat API rejected message: HTTP 403");
    }
}
