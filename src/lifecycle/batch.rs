//! # Batch execution
//!
//! A single chunked-concurrency/retry/timeout executor shared by every
//! `batch*` operation on [`crate::lifecycle::LifecycleManager`]. Input is
//! chunked into groups of `max_concurrent` and each group is awaited in
//! order, preserving input indices in the result; per-item retry uses
//! exponential backoff `retry_delay * 2^attempt`.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::error::{Error, Result};
use crate::provider::DEFAULT_BATCH_ITEM_TIMEOUT;

/// A boxed, `'static`, `Send` future yielding `Result<T>` — the shape every
/// batch item closure must produce.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Options accepted by every `batch*` operation.
#[derive(Clone, Copy, Debug)]
pub struct BatchOptions {
    /// When `false` (the default), the first failed item aborts the whole
    /// batch; its error is returned and no further chunks are started.
    pub continue_on_error: bool,
    /// How many items run concurrently per chunk.
    pub max_concurrent: usize,
    /// How many times a failed item is retried before being recorded as
    /// failed.
    pub retry_count: u32,
    /// Base delay (ms) for the exponential backoff between retries.
    pub retry_delay_ms: u64,
    /// Per-item timeout (ms).
    pub timeout_ms: u64,
    /// Whether eligibility is validated before any item runs. Consulted by
    /// the caller (e.g. `LifecycleManager::inscribe_on_bitcoin`'s single-
    /// transaction path); `run_batch` itself does not interpret it.
    pub validate_first: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            max_concurrent: 1,
            retry_count: 0,
            retry_delay_ms: 1000,
            timeout_ms: DEFAULT_BATCH_ITEM_TIMEOUT.as_millis() as u64,
            validate_first: true,
        }
    }
}

/// One batch item's successful outcome.
#[derive(Clone, Debug)]
pub struct BatchSuccess<T> {
    /// The item's position in the input.
    pub index: usize,
    /// The operation's result.
    pub result: T,
    /// How long the (possibly retried) operation took, in milliseconds.
    pub duration_ms: u64,
}

/// One batch item's terminal failure, after exhausting retries.
#[derive(Clone, Debug)]
pub struct BatchFailure {
    /// The item's position in the input.
    pub index: usize,
    /// The final error's display string.
    pub error: String,
    /// How long the (possibly retried) operation took, in milliseconds.
    pub duration_ms: u64,
    /// How many retries were attempted.
    pub retry_attempts: u32,
}

/// The outcome of a whole batch.
#[derive(Clone, Debug)]
pub struct BatchOutcome<T> {
    /// Successful items, in no particular order (index disambiguates).
    pub successful: Vec<BatchSuccess<T>>,
    /// Failed items, in no particular order.
    pub failed: Vec<BatchFailure>,
    /// `successful.len() + failed.len()`.
    pub total_processed: usize,
    /// Wall-clock duration of the whole batch, in milliseconds.
    pub total_duration_ms: u64,
    /// A fresh id identifying this batch run.
    pub batch_id: String,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the batch finished.
    pub completed_at: DateTime<Utc>,
}

type OneOutcome<T> = std::result::Result<(usize, T, u64), (usize, String, u64, u32)>;

async fn run_one<T>(
    index: usize, opts: BatchOptions, make_op: &(dyn Fn(usize) -> BoxFuture<'static, T> + Send + Sync),
) -> OneOutcome<T> {
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(opts.timeout_ms),
            make_op(index),
        )
        .await;

        let error = match outcome {
            Ok(Ok(result)) => return Ok((index, result, start.elapsed().as_millis() as u64)),
            Ok(Err(e)) => e.to_string(),
            Err(_) => Error::timeout("batch item", opts.timeout_ms).to_string(),
        };

        if attempts >= opts.retry_count {
            return Err((index, error, start.elapsed().as_millis() as u64, attempts));
        }
        let backoff = opts.retry_delay_ms.saturating_mul(1u64 << attempts);
        tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
        attempts += 1;
    }
}

/// Run `count` items through `make_op`, honoring `opts`'s concurrency,
/// retry and timeout policy, and preserving input indices in the result.
///
/// # Errors
///
/// Returns the first item's error if `!opts.continue_on_error` and any item
/// ultimately fails; otherwise always returns `Ok`, with failures captured
/// in [`BatchOutcome::failed`].
pub async fn run_batch<T: Send + 'static>(
    count: usize, opts: BatchOptions,
    make_op: impl Fn(usize) -> BoxFuture<'static, T> + Send + Sync + 'static,
) -> Result<BatchOutcome<T>> {
    let batch_id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now();
    let overall_start = Instant::now();
    let make_op: std::sync::Arc<dyn Fn(usize) -> BoxFuture<'static, T> + Send + Sync> =
        std::sync::Arc::new(make_op);

    let mut successful = Vec::with_capacity(count);
    let mut failed = Vec::new();
    let mut aborted_error: Option<String> = None;

    let chunk_size = opts.max_concurrent.max(1);
    let mut index = 0;
    while index < count {
        let end = (index + chunk_size).min(count);
        let group: Vec<usize> = (index..end).collect();
        let results = join_all(group.into_iter().map(|i| {
            let make_op = make_op.clone();
            async move { run_one(i, opts, make_op.as_ref()).await }
        }))
        .await;

        for result in results {
            match result {
                Ok((i, result, duration_ms)) => {
                    successful.push(BatchSuccess { index: i, result, duration_ms });
                }
                Err((i, error, duration_ms, retry_attempts)) => {
                    if !opts.continue_on_error && aborted_error.is_none() {
                        aborted_error = Some(error.clone());
                    }
                    failed.push(BatchFailure { index: i, error, duration_ms, retry_attempts });
                }
            }
        }

        if !opts.continue_on_error && !failed.is_empty() {
            break;
        }
        index = end;
    }

    if let Some(error) = aborted_error {
        if !opts.continue_on_error {
            return Err(Error::External(format!("batch aborted: {error}")));
        }
    }

    let total_processed = successful.len() + failed.len();
    Ok(BatchOutcome {
        successful,
        failed,
        total_processed,
        total_duration_ms: overall_start.elapsed().as_millis() as u64,
        batch_id,
        started_at,
        completed_at: Utc::now(),
    })
}
