//! In-memory `LogStore` for tests.
//!
//! Records every appended event in order and supports injecting failures at
//! chosen call positions, so callers can exercise persistence errors without
//! a database.

use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use tokio::sync::RwLock;

use super::LogStore;
use crate::{
    error::{CoreError, Result},
    models::LogEvent,
};

/// Mock storage recording appended events in memory.
#[derive(Clone, Default)]
pub struct MockLogStore {
    events: Arc<RwLock<Vec<LogEvent>>>,
    calls: Arc<AtomicUsize>,
    failures: Arc<RwLock<HashMap<usize, String>>>,
    always_fail: Arc<RwLock<Option<String>>>,
    panic_on_append: Arc<RwLock<bool>>,
}

impl MockLogStore {
    /// Creates a new mock storage with no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `call`-th append (1-based) fail with a database error.
    pub async fn inject_failure_at(&self, call: usize, error: impl Into<String>) {
        self.failures.write().await.insert(call, error.into());
    }

    /// Makes every append fail with a database error.
    pub async fn fail_always(&self, error: impl Into<String>) {
        *self.always_fail.write().await = Some(error.into());
    }

    /// Makes every append panic instead of returning.
    pub async fn panic_on_append(&self) {
        *self.panic_on_append.write().await = true;
    }

    /// Returns all successfully stored events in append order.
    pub async fn stored_events(&self) -> Vec<LogEvent> {
        self.events.read().await.clone()
    }

    /// Returns how many append calls were made, failed ones included.
    pub fn append_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LogStore for MockLogStore {
    fn append<'a>(
        &'a self,
        event: &'a LogEvent,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

            if *self.panic_on_append.read().await {
                panic!("mock storage panicked on append {call}");
            }

            if let Some(error) = self.always_fail.read().await.clone() {
                return Err(CoreError::Database(error));
            }

            if let Some(error) = self.failures.write().await.remove(&call) {
                return Err(CoreError::Database(error));
            }

            self.events.write().await.push(event.clone());
            Ok(())
        })
    }
}
