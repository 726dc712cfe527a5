//! Error types for validation and persistence of log events.
//!
//! Validation errors describe a payload that can never become a `LogEvent`;
//! database errors describe a well-formed event that could not be stored.
//! Callers use `is_validation` to pick their own failure representation.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for validation and storage operations.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// One or more required fields are absent or empty.
    #[error("Missing required fields: service, instance, level, message")]
    MissingField {
        /// Names of the fields that were absent or empty
        missing: Vec<&'static str>,
    },

    /// A field is present but has the wrong JSON type.
    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: &'static str,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl CoreError {
    /// Returns whether the error was caused by the input rather than storage.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidField { .. })
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                Self::Database(format!("check constraint violation: {db_err}"))
            },
            sqlx::Error::PoolTimedOut => {
                Self::Database("timed out acquiring a database connection".to_string())
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_lists_required_fields() {
        let err = CoreError::MissingField { missing: vec!["level"] };

        assert_eq!(err.to_string(), "Missing required fields: service, instance, level, message");
        assert!(err.is_validation());
    }

    #[test]
    fn database_errors_are_not_validation_errors() {
        let err = CoreError::from(sqlx::Error::PoolTimedOut);

        assert!(!err.is_validation());
        assert!(err.to_string().starts_with("Database error:"));
    }
}
