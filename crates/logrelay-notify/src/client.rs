//! Telegram Bot API transport.
//!
//! Posts `{chat_id, text}` to `{api_base}/bot{token}/sendMessage`. Any
//! non-2xx answer is reported as `NotifyError::Rejected`.

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn, Instrument};

use crate::{
    error::{NotifyError, Result},
    notifier::{ChatTarget, ChatTransport},
};

/// Longest response body kept in a rejection error.
const MAX_ERROR_BODY: usize = 512;

/// Configuration for the chat API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Bot API, without trailing slash.
    pub api_base: String,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            user_agent: concat!("logrelay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Chat transport backed by the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl TelegramTransport {
    /// Creates a new transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Configuration` if the HTTP client cannot be
    /// built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NotifyError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.config.api_base.trim_end_matches('/'), bot_token)
    }

    async fn post(&self, target: &ChatTarget, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(target.bot_token()))
            .json(&SendMessage { chat_id: target.chat_id(), text })
            .send()
            .await
            .map_err(|e| NotifyError::network(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Chat message accepted");
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
        warn!(status = status.as_u16(), "Chat API rejected message");
        Err(NotifyError::rejected(status.as_u16(), body))
    }
}

impl ChatTransport for TelegramTransport {
    fn send_message<'a>(
        &'a self,
        target: &'a ChatTarget,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        let span = info_span!("chat_send", chat_id = %target.chat_id(), length = text.len());
        Box::pin(self.post(target, text).instrument(span))
    }
}

/// Largest index `<= max` that falls on a char boundary of `text`.
fn floor_char_boundary(text: &str, max: usize) -> usize {
    if text.len() <= max {
        return text.len();
    }
    (0..=max).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0)
}
