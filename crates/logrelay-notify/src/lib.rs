//! Best-effort chat notifications for the log relay.
//!
//! High-severity log events and operator-facing error reports are sent as
//! plain text to a chat channel. Sending never fails the caller: the
//! `Notifier` logs transport errors and drops them.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use logrelay_notify::{ChatTarget, ClientConfig, Notifier, TelegramTransport};
//!
//! # async fn example() -> Result<(), logrelay_notify::NotifyError> {
//! let transport = TelegramTransport::new(ClientConfig::default())?;
//! let target = ChatTarget::from_parts(Some("123:abc".into()), Some("-100200".into()));
//! let notifier = Notifier::new(Arc::new(transport), target);
//!
//! notifier.notify_error("database unreachable").await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod mock;
pub mod notifier;

pub use client::{ClientConfig, TelegramTransport};
pub use error::{NotifyError, Result};
pub use notifier::{
    format_error, format_event, ChatTarget, ChatTransport, Notifier, SendOutcome, ERROR_PREFIX,
};
