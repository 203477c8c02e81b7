//! Batch existence engine.
//!
//! Fans a slice of keys out to a fixed pool of tokio workers over a job
//! channel and collects one result per key from a shared result channel.
//! Each job carries the key's input position, so answers are written back in
//! input order no matter which worker finishes first. The first failed lookup
//! aborts the whole batch.

use crate::error::{Error, Result};
use crate::oracle::KeyOracle;
use crate::telemetry::batch::{record_state_transition, start_batch_span};
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, warn};

/// One key tagged with its position in the input.
#[derive(Debug)]
struct Job<K> {
    index: usize,
    key: K,
}

/// Outcome of one job, produced by exactly one worker.
#[derive(Debug)]
struct LookupResult<K> {
    outcome: Result<bool>,
    job: Job<K>,
}

type SharedJobs<K> = Arc<Mutex<mpsc::Receiver<Job<K>>>>;

/// Validate a signed worker count coming from configuration or user input.
///
/// Anything below 1 is rejected with [`Error::InvalidWorkerCount`].
pub fn worker_count(workers: i64) -> Result<usize> {
    match usize::try_from(workers) {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::InvalidWorkerCount(workers)),
    }
}

/// Check which of `keys` exist, using `workers` concurrent lookups.
///
/// Returns one bool per key, in input order. Fails with
/// [`Error::InvalidWorkerCount`] before doing any work if `workers` is 0, and
/// with the oracle's own error if any single lookup fails; in that case no
/// partial results are returned.
///
/// Must be called from within a tokio runtime.
pub async fn batch_exists<K, O>(oracle: Arc<O>, keys: &[K], workers: usize) -> Result<Vec<bool>>
where
    K: Clone + Send + Sync + 'static,
    O: KeyOracle<K> + ?Sized + 'static,
{
    batch_exists_with_cancel(oracle, keys, workers, CancellationToken::new()).await
}

/// Like [`batch_exists`], but lookups observe `cancel`.
///
/// Cancelling the token makes in-flight and pending lookups fail with
/// [`Error::Cancelled`], which fails the batch.
pub async fn batch_exists_with_cancel<K, O>(
    oracle: Arc<O>,
    keys: &[K],
    workers: usize,
    cancel: CancellationToken,
) -> Result<Vec<bool>>
where
    K: Clone + Send + Sync + 'static,
    O: KeyOracle<K> + ?Sized + 'static,
{
    if workers == 0 {
        metrics::batches().add(1, &[KeyValue::new("outcome", "rejected")]);
        return Err(Error::InvalidWorkerCount(0));
    }

    let span = start_batch_span(keys.len(), workers);
    let started = Instant::now();

    let result = run_batch(oracle, keys, workers, cancel)
        .instrument(span.clone())
        .await;

    let outcome = if result.is_ok() { "succeeded" } else { "failed" };
    metrics::batches().add(1, &[KeyValue::new("outcome", outcome)]);
    metrics::batch_duration_ms().record(
        started.elapsed().as_secs_f64() * 1000.0,
        &[KeyValue::new("outcome", outcome)],
    );

    result
}

async fn run_batch<K, O>(
    oracle: Arc<O>,
    keys: &[K],
    workers: usize,
    cancel: CancellationToken,
) -> Result<Vec<bool>>
where
    K: Clone + Send + Sync + 'static,
    O: KeyOracle<K> + ?Sized + 'static,
{
    let span = tracing::Span::current();
    record_state_transition(&span, "created", "dispatching");

    // tokio channels reject a capacity of zero.
    let capacity = keys.len().max(1);
    let (job_tx, job_rx) = mpsc::channel::<Job<K>>(capacity);
    let (result_tx, result_rx) = mpsc::channel::<LookupResult<K>>(capacity);
    let jobs: SharedJobs<K> = Arc::new(Mutex::new(job_rx));

    // Child token: an aborted batch cancels its own workers without touching
    // the caller's token.
    let batch_cancel = cancel.child_token();
    let _cancel_on_exit = batch_cancel.clone().drop_guard();

    // Workers beyond one per job would only observe a closed channel.
    let spawned = workers.min(capacity);

    // Dropping the set aborts any worker still running when we return early.
    let mut pool = JoinSet::new();
    for worker_id in 0..spawned {
        pool.spawn(
            worker(
                worker_id,
                Arc::clone(&oracle),
                Arc::clone(&jobs),
                result_tx.clone(),
                batch_cancel.clone(),
            )
            .in_current_span(),
        );
    }
    // Only workers hold the job receiver and result senders now; both
    // channels close once every worker has exited.
    drop(jobs);
    drop(result_tx);

    let dispatched = dispatch(job_tx, keys).await;
    if let Err(e) = dispatched {
        record_state_transition(&span, "dispatching", "failed");
        return Err(e);
    }
    record_state_transition(&span, "dispatching", "collecting");

    let collected = collect(result_rx, keys.len()).await;
    let outcome = if collected.is_ok() { "succeeded" } else { "failed" };
    record_state_transition(&span, "collecting", outcome);
    collected
}

/// Enqueue one job per key, then close the job channel by dropping the sender.
async fn dispatch<K: Clone>(job_tx: mpsc::Sender<Job<K>>, keys: &[K]) -> Result<()> {
    for (index, key) in keys.iter().enumerate() {
        let job = Job {
            index,
            key: key.clone(),
        };
        if job_tx.send(job).await.is_err() {
            return Err(Error::WorkerPool(format!(
                "all workers exited after {index} of {} jobs were dispatched",
                keys.len()
            )));
        }
    }
    Ok(())
}

/// Gather exactly `expected` results into input order, failing on the first
/// lookup error.
async fn collect<K>(
    mut result_rx: mpsc::Receiver<LookupResult<K>>,
    expected: usize,
) -> Result<Vec<bool>> {
    let mut out = vec![false; expected];
    for received in 0..expected {
        let Some(result) = result_rx.recv().await else {
            return Err(Error::WorkerPool(format!(
                "workers exited after {received} of {expected} results"
            )));
        };

        match result.outcome {
            Ok(exists) => out[result.job.index] = exists,
            Err(e) => {
                warn!(index = result.job.index, error = %e, "lookup failed, aborting batch");
                return Err(e);
            }
        }
    }

    Ok(out)
}

/// Pull jobs until the job channel is closed and drained.
///
/// A failed lookup is reported through the result channel and the worker
/// moves on to the next job.
async fn worker<K, O>(
    worker_id: usize,
    oracle: Arc<O>,
    jobs: SharedJobs<K>,
    results: mpsc::Sender<LookupResult<K>>,
    cancel: CancellationToken,
) where
    K: Send + Sync + 'static,
    O: KeyOracle<K> + ?Sized + 'static,
{
    let mut processed = 0usize;

    loop {
        // Lock only for the receive so other workers can pull while we look up.
        let next = jobs.lock().await.recv().await;
        let Some(job) = next else { break };

        let outcome = if cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::Cancelled),
                r = oracle.key_exists(&job.key, &cancel) => r,
            }
        };

        let label = match outcome {
            Ok(true) => "found",
            Ok(false) => "missing",
            Err(Error::Cancelled) => "cancelled",
            Err(_) => "error",
        };
        metrics::lookups().add(1, &[KeyValue::new("result", label)]);
        processed += 1;

        if results.send(LookupResult { outcome, job }).await.is_err() {
            // Collector is gone; nobody will read further results.
            break;
        }
    }

    debug!(worker_id, processed, "worker finished");
}
