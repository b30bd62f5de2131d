//! Fan out workers against one query until a deadline, then count.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::error::QueryError;
use crate::executor::QueryExecutor;

/// What to run, for how long, and with how many workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRequest {
    pub query: String,
    pub duration: Duration,
    pub workers: usize,
}

impl BenchmarkRequest {
    /// Build a request from a signed millisecond duration. Anything not
    /// positive becomes a zero-length run.
    pub fn new(query: impl Into<String>, duration_ms: i64, workers: usize) -> Self {
        let duration = u64::try_from(duration_ms)
            .map(Duration::from_millis)
            .unwrap_or(Duration::ZERO);
        Self {
            query: query.into(),
            duration,
            workers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkResult {
    pub total_queries: u64,
    pub elapsed: Duration,
    pub rps: f64,
}

impl BenchmarkResult {
    fn new(total_queries: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let rps = if secs > 0.0 {
            total_queries as f64 / secs
        } else {
            0.0
        };
        Self {
            total_queries,
            elapsed,
            rps,
        }
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total queries executed: {}", self.total_queries)?;
        writeln!(f, "Total time: {:?}", self.elapsed)?;
        write!(f, "RPS (queries per second): {:.2}", self.rps)
    }
}

/// Lets something outside the run (a signal handler) end it early.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct BenchmarkRunner<E> {
    executor: Arc<E>,
    stop: StopHandle,
}

impl<E> BenchmarkRunner<E>
where
    E: QueryExecutor + 'static,
{
    pub fn new(executor: Arc<E>) -> Self {
        Self {
            executor,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run `request` to completion.
    ///
    /// Returns once every worker has exited. Elapsed time is measured up to
    /// that point, so it can run slightly past `request.duration`.
    pub async fn run(&self, request: &BenchmarkRequest) -> BenchmarkResult {
        info!(
            query = %request.query,
            duration = ?request.duration,
            workers = request.workers,
            "starting benchmark"
        );

        let query: Arc<str> = Arc::from(request.query.as_str());
        let counter = Arc::new(AtomicU64::new(0));
        let start = Instant::now();
        let deadline = start + request.duration;
        let mut handles = Vec::with_capacity(request.workers);

        for worker in 0..request.workers {
            let executor = self.executor.clone();
            let query = query.clone();
            let counter = counter.clone();
            let stop = self.stop.clone();

            handles.push(tokio::spawn(async move {
                let mut ok = 0u64;
                let mut failed = 0u64;

                while !stop.is_stopped() && Instant::now() < deadline {
                    let outcome = match timeout_at(deadline, executor.execute(&query)).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(QueryError::DeadlineExceeded),
                    };
                    match outcome {
                        Ok(()) => {
                            counter.fetch_add(1, Ordering::Relaxed);
                            ok += 1;
                        }
                        Err(e) => {
                            warn!(worker, error = %e, "query failed");
                            failed += 1;
                        }
                    }
                }

                debug!(worker, ok, failed, "worker finished");
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task did not complete");
            }
        }

        let elapsed = start.elapsed();
        let result = BenchmarkResult::new(counter.load(Ordering::Relaxed), elapsed);
        info!(
            total_queries = result.total_queries,
            elapsed = ?elapsed,
            rps = result.rps,
            "benchmark finished"
        );
        result
    }
}
