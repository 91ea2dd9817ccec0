//! Bounded pool of dispatch workers.
//!
//! The bus callback hands payloads to [`WorkerPool::dispatch`], which only
//! counts and enqueues. `pool_size` worker tasks pull from the shared queue
//! and run [`Dispatcher::process`] one payload at a time.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::dispatcher::Dispatcher;
use crate::error::{AppError, AppResult};
use crate::metrics::{MetricsSink, NOTIFICATIONS_HANDLED, NOTIFICATIONS_RECEIVED};
use crate::models::NotificationKind;

/// Exception tag for payloads arriving after shutdown began
pub const WORKER_POOL_CLOSED: &str = "WorkerPoolClosed";

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Bytes>>>;

pub struct WorkerPool {
    sender: RwLock<Option<mpsc::UnboundedSender<Bytes>>>,
    metrics: Arc<dyn MetricsSink>,
    receiver: SharedReceiver,
    workers: Mutex<Vec<JoinHandle<()>>>,
    cancellation_token: CancellationToken,
}

impl WorkerPool {
    /// Spawn `pool_size` workers on the current runtime
    pub fn start(dispatcher: Arc<Dispatcher>, pool_size: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver: SharedReceiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let cancellation_token = CancellationToken::new();

        let workers = (0..pool_size.max(1))
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    dispatcher.clone(),
                    receiver.clone(),
                    cancellation_token.clone(),
                ))
            })
            .collect::<Vec<_>>();

        info!(pool_size = workers.len(), "Dispatch workers started");

        Self {
            sender: RwLock::new(Some(sender)),
            metrics: dispatcher.metrics().clone(),
            receiver,
            workers: Mutex::new(workers),
            cancellation_token,
        }
    }

    /// Count the payload as received and queue it. Never blocks.
    ///
    /// Returns `false` when the pool is shutting down; the payload is then
    /// recorded as handled with a `WorkerPoolClosed` failure.
    pub fn dispatch(&self, payload: Bytes) -> bool {
        self.metrics.increment_counter(NOTIFICATIONS_RECEIVED, &[]);

        let queued = match self.sender.read() {
            Ok(sender) => sender
                .as_ref()
                .is_some_and(|sender| sender.send(payload).is_ok()),
            Err(_) => false,
        };

        if !queued {
            self.record_closed();
            warn!("Worker pool is closed, dropping notification request");
        }

        queued
    }

    fn record_closed(&self) {
        self.metrics.record_timer(
            NOTIFICATIONS_HANDLED,
            Duration::ZERO,
            &[
                ("status", "failed"),
                ("exception", WORKER_POOL_CLOSED),
                ("type", NotificationKind::INVALID),
            ],
        );
    }

    /// Take every payload still queued, recording each as closed
    async fn abandon_queued(&self) -> usize {
        let mut receiver = self.receiver.lock().await;
        let mut abandoned = 0;
        while receiver.try_recv().is_ok() {
            self.record_closed();
            abandoned += 1;
        }
        abandoned
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().map_or(true, |sender| sender.is_none())
    }

    /// Stop accepting payloads and wait for queued ones to be processed
    ///
    /// # Errors
    ///
    /// Returns an error if the queue is not drained within `timeout`. The
    /// workers are then told to stop after their current payload and every
    /// payload left in the queue is recorded as a `WorkerPoolClosed` failure.
    pub async fn shutdown(&self, timeout: Duration) -> AppResult<()> {
        if let Ok(mut sender) = self.sender.write() {
            sender.take();
        }

        let handles = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(_) => Vec::new(),
        };

        info!(
            worker_count = handles.len(),
            timeout_seconds = timeout.as_secs(),
            "Draining dispatch workers"
        );

        let started = Instant::now();
        match tokio::time::timeout(timeout, futures::future::join_all(handles)).await {
            Ok(results) => {
                for (worker_id, result) in results.into_iter().enumerate() {
                    if let Err(join_error) = result {
                        error!(worker_id, error = %join_error, "Dispatch worker failed");
                    }
                }
                info!(elapsed_ms = started.elapsed().as_millis() as u64, "Worker pool drained");
                Ok(())
            }
            Err(_) => {
                self.cancellation_token.cancel();
                let abandoned = self.abandon_queued().await;
                error!(
                    timeout_seconds = timeout.as_secs(),
                    abandoned,
                    "Worker pool did not drain in time, queued notifications are abandoned"
                );
                Err(AppError::Internal {
                    source: anyhow::anyhow!("worker pool did not drain within {:?}", timeout),
                })
            }
        }
    }
}

async fn run_worker(
    worker_id: usize,
    dispatcher: Arc<Dispatcher>,
    receiver: SharedReceiver,
    cancellation_token: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            next = async { receiver.lock().await.recv().await } => next,
        };

        match next {
            Some(payload) => dispatcher.process(&payload).await,
            None => break,
        }
    }

    debug!(worker_id, "Dispatch worker stopped");
}
