//! Storage layer for accepted log events.
//!
//! The relay only ever appends: there is no read, update or delete path.
//! `LogStore` is the seam the ingestion pipeline depends on, so the pipeline
//! can run against PostgreSQL in production and against `mock::MockLogStore`
//! in tests.

use std::{future::Future, pin::Pin, sync::Arc};

use sqlx::PgPool;

pub mod log_events;
pub mod mock;

use crate::{error::Result, models::LogEvent};

/// Append-only sink for validated log events.
pub trait LogStore: Send + Sync + 'static {
    /// Appends one event as a new row.
    ///
    /// No idempotency key is involved, so appending the same event twice
    /// stores two rows.
    fn append<'a>(
        &'a self,
        event: &'a LogEvent,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Container for repository instances sharing one connection pool.
#[derive(Clone)]
pub struct Storage {
    /// Repository for the durable log table.
    pub log_events: Arc<log_events::Repository>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { log_events: Arc::new(log_events::Repository::new(Arc::new(pool))) }
    }

    /// Verifies the database answers a trivial query.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.log_events.pool()).await?;

        Ok(())
    }
}

impl LogStore for Storage {
    fn append<'a>(
        &'a self,
        event: &'a LogEvent,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { self.log_events.insert(event).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_can_be_created() {
        let pool = sqlx::PgPool::connect_lazy("postgresql://localhost/logrelay").unwrap();
        let _storage = Storage::new(pool);
    }
}
