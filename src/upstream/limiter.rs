//! Outbound Request Limiter
//!
//! Single-lane FIFO queue that serializes upstream calls at a fixed ceiling of
//! R calls per second. One drain task owns the queue: it pops a job, runs it to
//! completion, waits `1000 / R` milliseconds, and repeats. When the queue is
//! empty the task parks on the channel until the next `enqueue`.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ProxyError, Result};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

// == Queue Stats ==
/// Snapshot of queue activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    /// Jobs submitted but not yet finished
    pub pending: usize,
    /// Jobs that have run to completion (success or failure)
    pub completed: u64,
    /// Configured ceiling
    pub requests_per_second: u32,
}

#[derive(Debug, Default)]
struct Counters {
    pending: AtomicUsize,
    completed: AtomicU64,
}

// == Request Limiter ==
/// Rate-limited FIFO for upstream work.
///
/// Must be constructed inside a Tokio runtime; the drain task is spawned
/// immediately and aborted by [`RequestLimiter::shutdown`] or on drop.
#[derive(Debug)]
pub struct RequestLimiter {
    sender: mpsc::UnboundedSender<Job>,
    counters: Arc<Counters>,
    requests_per_second: u32,
    drain: JoinHandle<()>,
}

impl RequestLimiter {
    // == Constructor ==
    /// Creates a limiter issuing at most `requests_per_second` calls per second.
    ///
    /// A ceiling of zero is treated as one.
    pub fn new(requests_per_second: u32) -> Self {
        let requests_per_second = requests_per_second.max(1);
        let interval = Duration::from_millis(1000 / u64::from(requests_per_second));
        let (sender, receiver) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());

        let drain = tokio::spawn(drain_queue(receiver, interval, counters.clone()));
        info!(
            "Upstream request queue started at {} req/s ({}ms spacing)",
            requests_per_second,
            interval.as_millis()
        );

        Self {
            sender,
            counters,
            requests_per_second,
            drain,
        }
    }

    // == Enqueue ==
    /// Queues `work` behind everything already submitted and waits for its result.
    ///
    /// `work` should perform exactly one upstream call. Its failure is delivered
    /// to this caller only; the queue moves on to the next job regardless. Once
    /// submitted, a job runs even if the caller stops waiting.
    pub async fn enqueue<F, Fut, T>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let outcome = work().await;
            // receiver gone means the caller was cancelled
            let _ = reply.send(outcome);
        });

        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(job).is_err() {
            self.counters.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(ProxyError::Internal(
                "upstream request queue is closed".to_string(),
            ));
        }

        result.await.map_err(|_| {
            ProxyError::Internal("upstream request was dropped before completing".to_string())
        })?
    }

    // == Stats ==
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.counters.pending.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            requests_per_second: self.requests_per_second,
        }
    }

    // == Shutdown ==
    /// Stops the drain task. Jobs still queued are dropped and their callers
    /// receive an internal error.
    pub fn shutdown(&self) {
        if !self.drain.is_finished() {
            self.drain.abort();
            warn!("Upstream request queue stopped");
        }
    }
}

impl Drop for RequestLimiter {
    fn drop(&mut self) {
        self.drain.abort();
    }
}

/// Drain loop: strictly one job at a time, in submission order.
async fn drain_queue(
    mut receiver: mpsc::UnboundedReceiver<Job>,
    interval: Duration,
    counters: Arc<Counters>,
) {
    while let Some(job) = receiver.recv().await {
        // A panicking job must not take the queue down with it.
        if let Err(err) = tokio::spawn(job).await {
            warn!("Queued upstream call aborted: {}", err);
        }

        counters.pending.fetch_sub(1, Ordering::SeqCst);
        counters.completed.fetch_add(1, Ordering::SeqCst);
        debug!("Upstream queue: {} pending", counters.pending.load(Ordering::SeqCst));

        tokio::time::sleep(interval).await;
    }
}
