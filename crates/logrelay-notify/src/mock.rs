//! In-memory `ChatTransport` for tests.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use tokio::sync::RwLock;

use crate::{
    error::{NotifyError, Result},
    notifier::{ChatTarget, ChatTransport},
};

/// A message the mock transport accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Chat the message was addressed to
    pub chat_id: String,
    /// Message body
    pub text: String,
}

/// Mock transport recording accepted messages.
///
/// Clones share state, so a test can keep one handle and give another to the
/// code under test.
#[derive(Clone, Default)]
pub struct MockTransport {
    sent: Arc<RwLock<Vec<SentMessage>>>,
    attempts: Arc<AtomicUsize>,
    failure: Arc<RwLock<Option<NotifyError>>>,
}

impl MockTransport {
    /// Creates a new mock transport that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail with `error`.
    pub async fn fail_with(&self, error: NotifyError) {
        *self.failure.write().await = Some(error);
    }

    /// Returns accepted messages in send order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    /// Returns how many sends were attempted, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ChatTransport for MockTransport {
    fn send_message<'a>(
        &'a self,
        target: &'a ChatTarget,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);

            if let Some(error) = self.failure.read().await.clone() {
                return Err(error);
            }

            self.sent
                .write()
                .await
                .push(SentMessage { chat_id: target.chat_id().to_string(), text: text.to_string() });
            Ok(())
        })
    }
}
