//! SQL throughput benchmark: run one statement from many workers for a fixed
//! time and report how many succeeded per second.

pub mod config;
pub mod error;
pub mod executor;
pub mod runner;

pub use config::{Args, BenchConfig};
pub use error::{BenchError, ConfigError, QueryError};
pub use executor::{connect_postgres, QueryExecutor};
pub use runner::{BenchmarkRequest, BenchmarkResult, BenchmarkRunner, StopHandle};
