//! Notification formatting and fire-and-forget dispatch.

use std::{fmt, future::Future, pin::Pin, sync::Arc};

use logrelay_core::LogEvent;
use tracing::{debug, warn};

use crate::error::Result;

/// Prefix prepended to every error report.
pub const ERROR_PREFIX: &str = "❌";

/// Credentials and destination for chat messages.
///
/// The bot token never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ChatTarget {
    bot_token: String,
    chat_id: String,
}

impl ChatTarget {
    /// Builds a target when both the bot token and chat id are present and
    /// non-empty.
    pub fn from_parts(bot_token: Option<String>, chat_id: Option<String>) -> Option<Self> {
        let bot_token = bot_token.filter(|token| !token.is_empty())?;
        let chat_id = chat_id.filter(|id| !id.is_empty())?;
        Some(Self { bot_token, chat_id })
    }

    /// Returns the bot credential.
    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    /// Returns the destination chat id.
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl fmt::Debug for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTarget")
            .field("bot_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Something that can post a text message to a chat.
pub trait ChatTransport: Send + Sync + 'static {
    /// Sends `text` to the chat described by `target`.
    fn send_message<'a>(
        &'a self,
        target: &'a ChatTarget,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// What happened to a message handed to the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The transport accepted the message.
    Sent,
    /// No chat target is configured, nothing was sent.
    Skipped,
}

/// Formats a high-severity event as a multi-line chat message.
pub fn format_event(event: &LogEvent) -> String {
    format!(
        "🚨 High severity log\nService: {}\nInstance: {}\nLevel: {}\nMessage: {}",
        event.service, event.instance, event.level, event.message
    )
}

/// Formats an operator-facing error report.
pub fn format_error(text: &str) -> String {
    format!("{ERROR_PREFIX} {text}")
}

/// Sends notifications without ever failing the caller.
///
/// Holds the transport and an optional target. Without a target every send
/// is a silent no-op.
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn ChatTransport>,
    target: Option<ChatTarget>,
}

impl Notifier {
    /// Creates a notifier for the given transport and target.
    pub fn new(transport: Arc<dyn ChatTransport>, target: Option<ChatTarget>) -> Self {
        Self { transport, target }
    }

    /// Returns whether a chat target is configured.
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Sends raw text to the configured chat.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the send fails. The `notify_*`
    /// methods log and drop it instead.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let Some(target) = &self.target else {
            debug!("No chat target configured, skipping notification");
            return Ok(SendOutcome::Skipped);
        };

        self.transport.send_message(target, text).await?;
        Ok(SendOutcome::Sent)
    }

    /// Notifies about a high-severity log event.
    pub async fn notify_event(&self, event: &LogEvent) {
        if let Err(e) = self.send(&format_event(event)).await {
            warn!(
                error = %e,
                service = %event.service,
                level = event.level,
                "Failed to send log event notification"
            );
        }
    }

    /// Reports an error to the operator chat.
    pub async fn notify_error(&self, text: &str) {
        if let Err(e) = self.send(&format_error(text)).await {
            warn!(error = %e, "Failed to send error notification");
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").field("target", &self.target).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::NotifyError, mock::MockTransport};

    fn event(level: i64) -> LogEvent {
        LogEvent {
            service: "payments".to_string(),
            instance: "payments-2".to_string(),
            level,
            message: "card processor timeout".to_string(),
        }
    }

    fn target() -> Option<ChatTarget> {
        ChatTarget::from_parts(Some("123:abc".to_string()), Some("-100".to_string()))
    }

    #[test]
    fn target_requires_both_parts() {
        assert!(ChatTarget::from_parts(Some("t".into()), None).is_none());
        assert!(ChatTarget::from_parts(None, Some("c".into())).is_none());
        assert!(ChatTarget::from_parts(Some(String::new()), Some("c".into())).is_none());
        assert!(ChatTarget::from_parts(Some("t".into()), Some("c".into())).is_some());
    }

    #[test]
    fn debug_output_masks_bot_token() {
        let rendered = format!("{:?}", target().unwrap());

        assert!(!rendered.contains("123:abc"));
        assert!(rendered.contains("-100"));
    }

    #[test]
    fn event_message_lists_every_field() {
        let text = format_event(&event(4));

        assert_eq!(
            text,
            "🚨 High severity log\nService: payments\nInstance: payments-2\nLevel: 4\nMessage: card processor timeout"
        );
    }

    #[tokio::test]
    async fn missing_target_skips_silently() {
        let transport = MockTransport::new();
        let notifier = Notifier::new(Arc::new(transport.clone()), None);

        assert_eq!(notifier.send("hello").await.unwrap(), SendOutcome::Skipped);
        notifier.notify_error("boom").await;

        assert!(transport.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn error_reports_carry_prefix() {
        let transport = MockTransport::new();
        let notifier = Notifier::new(Arc::new(transport.clone()), target());

        notifier.notify_error("insert failed").await;

        let sent = transport.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "❌ insert failed");
        assert_eq!(sent[0].chat_id, "-100");
    }

    #[tokio::test]
    async fn transport_failures_are_swallowed() {
        let transport = MockTransport::new();
        transport.fail_with(NotifyError::network("connection reset")).await;
        let notifier = Notifier::new(Arc::new(transport.clone()), target());

        assert!(notifier.send("direct").await.is_err());
        notifier.notify_event(&event(5)).await;

        assert_eq!(transport.attempts(), 2);
        assert!(transport.sent_messages().await.is_empty());
    }
}
