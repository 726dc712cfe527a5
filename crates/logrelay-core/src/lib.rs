//! Core domain model for the log relay.
//!
//! Provides the validated `LogEvent` type, the error taxonomy shared by the
//! ingestion path, and the storage layer that appends events to the durable
//! log table. The HTTP and notification crates build on these types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;

pub use error::{CoreError, Result};
pub use models::{LogEvent, ALERT_LEVEL, REQUIRED_FIELDS};
pub use storage::{LogStore, Storage};
