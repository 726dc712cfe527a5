//! Repository for the durable log table.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::debug;

use crate::{error::Result, models::LogEvent};

/// Name of the table accepted events are appended to.
pub const TABLE: &str = "logs";

const INSERT_SQL: &str = "INSERT INTO logs (service, instance, level, message) VALUES ($1, $2, $3, $4)";

/// Repository for log event rows.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Appends an event as a new row.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the insert fails.
    pub async fn insert(&self, event: &LogEvent) -> Result<()> {
        let result = sqlx::query(INSERT_SQL)
            .bind(&event.service)
            .bind(&event.instance)
            .bind(event.level)
            .bind(&event.message)
            .execute(&*self.pool)
            .await?;

        debug!(table = TABLE, rows = result.rows_affected(), "Log event inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_targets_log_table_with_ordered_columns() {
        assert!(INSERT_SQL.starts_with(&format!("INSERT INTO {TABLE} ")));
        assert!(INSERT_SQL.contains("(service, instance, level, message)"));
    }
}
