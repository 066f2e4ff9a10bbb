//! Request batching and dispatch.
//!
//! Many concurrent callers submit individual transcription requests; the
//! scheduler accumulates them into a batch until either `max_batch_size`
//! is reached or `batch_timeout` has elapsed since the batch opened,
//! whichever comes first. Each dispatch loop runs one batch at a time on
//! the blocking worker, so at most one batch per worker is ever in flight.
//!
//! Ordering: admission is FIFO at the queue; within a batch, results are
//! delivered positionally in submission order. A caller that disconnects
//! before dispatch just drops its result channel; delivery to it is
//! skipped. Once a request is in flight its computation is not cancelled.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::worker::{AsrBackend, BatchInput};

/// A validated request awaiting batch assembly.
#[derive(Debug)]
pub struct PendingRequest {
    pub id: String,
    pub input: BatchInput,
}

struct BatchItem {
    request: PendingRequest,
    respond_to: oneshot::Sender<Result<String>>,
}

/// Accepts concurrent submissions and groups them into micro-batches for
/// the inference worker.
pub struct BatchScheduler {
    tx: mpsc::Sender<BatchItem>,
}

impl BatchScheduler {
    /// Spawn `workers` dispatch loops over a shared bounded queue.
    /// `workers` is 1 in the single-device baseline; more loops allow one
    /// in-flight batch per loop.
    pub fn new(
        backend: Arc<dyn AsrBackend>,
        max_batch_size: usize,
        batch_timeout: std::time::Duration,
        queue_capacity: usize,
        workers: usize,
    ) -> Self {
        let max_batch = max_batch_size.max(1);
        let (tx, rx) = mpsc::channel(queue_capacity.max(max_batch));
        let rx = Arc::new(Mutex::new(rx));

        for worker_id in 0..workers.max(1) {
            tokio::spawn(run_dispatch_loop(
                worker_id,
                rx.clone(),
                backend.clone(),
                max_batch,
                batch_timeout,
            ));
        }

        Self { tx }
    }

    /// Admit a request and await its result. Suspends the caller until
    /// the batch containing it completes; this is the backpressure signal.
    pub async fn submit(&self, request: PendingRequest) -> Result<String> {
        let (respond_to, rx) = oneshot::channel();
        self.tx
            .try_send(BatchItem {
                request,
                respond_to,
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => Error::QueueFull,
                mpsc::error::TrySendError::Closed(_) => Error::SchedulerOffline,
            })?;

        rx.await.map_err(|_| Error::SchedulerOffline)?
    }
}

async fn run_dispatch_loop(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::Receiver<BatchItem>>>,
    backend: Arc<dyn AsrBackend>,
    max_batch: usize,
    batch_timeout: std::time::Duration,
) {
    loop {
        // Hold the queue lock only while assembling a batch, so sibling
        // loops and new submissions proceed during model execution.
        let batch = {
            let mut rx = queue.lock().await;
            let Some(first) = rx.recv().await else {
                debug!(worker_id, "Queue closed, dispatch loop exiting");
                return;
            };

            let mut batch = vec![first];
            let deadline = Instant::now() + batch_timeout;
            while batch.len() < max_batch {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match tokio::time::timeout(remaining, rx.recv()).await {
                    Ok(Some(item)) => batch.push(item),
                    Ok(None) | Err(_) => break,
                }
            }
            batch
        };

        debug!(worker_id, batch_size = batch.len(), "Dispatching batch");

        let mut inputs = Vec::with_capacity(batch.len());
        let mut senders = Vec::with_capacity(batch.len());
        for item in batch {
            inputs.push(item.request.input);
            senders.push(item.respond_to);
        }

        let worker = backend.clone();
        let handle = tokio::task::spawn_blocking(move || worker.transcribe_batch(&inputs));

        match handle.await {
            Ok(Ok(results)) if results.len() == senders.len() => {
                for (sender, result) in senders.into_iter().zip(results) {
                    // Receiver gone means the caller disconnected.
                    let _ = sender.send(result);
                }
            }
            Ok(Ok(results)) => {
                error!(
                    worker_id,
                    expected = senders.len(),
                    got = results.len(),
                    "Backend returned misaligned batch results"
                );
                let err = Error::Inference(format!(
                    "backend returned {} results for {} requests",
                    results.len(),
                    senders.len()
                ));
                fan_out(senders, err);
            }
            Ok(Err(err)) => {
                // Whole-batch failure: every co-batched request observes
                // the same error rather than vanishing.
                warn!(worker_id, %err, "Batch execution failed");
                fan_out(senders, err);
            }
            Err(join_err) => {
                error!(worker_id, %join_err, "Batch worker task panicked");
                fan_out(
                    senders,
                    Error::Inference(format!("batch worker task failed: {join_err}")),
                );
            }
        }
    }
}

fn fan_out(senders: Vec<oneshot::Sender<Result<String>>>, err: Error) {
    for sender in senders {
        let _ = sender.send(Err(err.clone()));
    }
}
