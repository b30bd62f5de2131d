use thiserror::Error;

/// Failure of a single benchmark query. Never fatal to the run.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("deadline exceeded while the query was in flight")]
    DeadlineExceeded,
}

/// Invalid command-line input, reported before anything connects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("an SQL query must be provided with --query")]
    MissingQuery,

    #[error("a database DSN must be provided with --dsn or DATABASE_URL")]
    MissingDsn,
}

/// Errors that stop the process.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to the database: {0}")]
    Connect(#[source] sqlx::Error),
}
