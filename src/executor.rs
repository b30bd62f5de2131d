//! The database side of the benchmark: anything that can run a statement.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{BenchError, QueryError};

/// Connections kept on top of one per worker.
const SPARE_CONNECTIONS: u32 = 8;
const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Executes a statement and reports only success or failure.
///
/// Implementations must be safe to share between workers; the runner holds a
/// single instance behind an `Arc`.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> Result<(), QueryError>;
}

#[async_trait]
impl QueryExecutor for PgPool {
    async fn execute(&self, query: &str) -> Result<(), QueryError> {
        // A bare &str goes through the simple query protocol, so the text is
        // not prepared and may hold any statement.
        sqlx::Executor::execute(self, query).await?;
        Ok(())
    }
}

/// Open a PostgreSQL pool sized for `workers` concurrent callers.
///
/// The pool connects eagerly so an unreachable server is reported before the
/// benchmark starts.
pub async fn connect_postgres(dsn: &str, workers: usize) -> Result<PgPool, BenchError> {
    let opts = PgConnectOptions::from_str(dsn).map_err(BenchError::Connect)?;

    pool_options(workers)
        .connect_with(opts)
        .await
        .map_err(BenchError::Connect)
}

fn pool_options(workers: usize) -> PgPoolOptions {
    let max_connections = u32::try_from(workers)
        .unwrap_or(u32::MAX)
        .saturating_add(SPARE_CONNECTIONS);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        // A liveness ping on every acquire would add a round trip to each
        // measured query.
        .test_before_acquire(false)
}
