//! HTTP entry points for the log relay.
//!
//! Two POST routes feed one ingestion pipeline: `/api` for authenticated
//! direct callers answering with ack/nack envelopes, and `/ably` for pub/sub
//! webhook batches answering with plain text.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod envelope;
pub mod handlers;
pub mod pipeline;
pub mod server;

pub use config::Config;
pub use pipeline::Pipeline;
pub use server::{create_router, start_server};

/// Shared secrets checked by the two entry points.
///
/// A missing secret rejects every request on its route.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Bearer token accepted on `/api`.
    pub write_token: Option<Arc<str>>,
    /// Value expected in `X-Ably-Auth` on `/ably`.
    pub webhook_secret: Option<Arc<str>>,
}

impl Credentials {
    /// Creates credentials from the two secrets.
    pub fn new(write_token: Option<&str>, webhook_secret: Option<&str>) -> Self {
        Self { write_token: write_token.map(Arc::from), webhook_secret: webhook_secret.map(Arc::from) }
    }
}

impl From<&Config> for Credentials {
    fn from(config: &Config) -> Self {
        Self::new(config.write_token.as_deref(), config.ably_webhook_secret.as_deref())
    }
}

/// Per-request context handed to every handler.
///
/// Everything inside is read-only after startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Secrets for both entry points.
    pub credentials: Credentials,
    /// Validation, persistence and notification pipeline.
    pub pipeline: Pipeline,
}

impl AppState {
    /// Creates the application state.
    pub fn new(credentials: Credentials, pipeline: Pipeline) -> Self {
        Self { credentials, pipeline }
    }
}
