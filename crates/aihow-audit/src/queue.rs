//! Bounded audit write queue with retries
//!
//! [`QueuedPersister`] places a bounded channel and a single worker task in
//! front of another persister. Callers still wait for the worker's
//! acknowledgement, so `append` only succeeds once the entry is stored.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::error::{AuditError, Result};
use crate::filter::AuditFilter;
use crate::models::AuditLogEntry;
use crate::persister::AuditPersister;

/// Exponential backoff for failed writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds
    pub initial_delay_ms: u64,
    /// Multiplier applied after each retry
    pub backoff_factor: f64,
    /// Upper bound for any single delay, in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            backoff_factor: 2.0,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_ms = self.initial_delay_ms as f64 * self.backoff_factor.powi(exponent);
        let capped_ms = delay_ms.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(capped_ms as u64)
    }
}

/// Settings for the write queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Route writes through the queue
    pub enabled: bool,
    /// Entries that may wait in the channel at once
    pub capacity: usize,
    /// How long `append` waits for channel space before failing
    pub enqueue_timeout_ms: u64,
    pub retry: RetryPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: 1024,
            enqueue_timeout_ms: 5_000,
            retry: RetryPolicy::default(),
        }
    }
}

struct QueuedWrite {
    entry: AuditLogEntry,
    ack: oneshot::Sender<Result<()>>,
}

/// Persister that serializes writes through a worker task
pub struct QueuedPersister {
    inner: Arc<dyn AuditPersister>,
    sender: mpsc::Sender<QueuedWrite>,
    enqueue_timeout: Duration,
}

impl QueuedPersister {
    /// Start the worker on the current tokio runtime
    ///
    /// The worker exits once the persister is dropped and the channel drains.
    pub fn spawn(inner: Arc<dyn AuditPersister>, config: &QueueConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        tokio::spawn(run_worker(
            Arc::clone(&inner),
            receiver,
            config.retry.clone(),
        ));

        debug!(capacity = config.capacity, "Started audit write queue");
        Self {
            inner,
            sender,
            enqueue_timeout: Duration::from_millis(config.enqueue_timeout_ms),
        }
    }
}

async fn run_worker(
    inner: Arc<dyn AuditPersister>,
    mut receiver: mpsc::Receiver<QueuedWrite>,
    retry: RetryPolicy,
) {
    while let Some(write) = receiver.recv().await {
        let result = persist_with_retry(inner.as_ref(), &write.entry, &retry).await;
        if let Err(ref e) = result {
            error!(entry_id = %write.entry.id, error = %e, "Audit entry could not be persisted");
        }
        // The caller may have gone away; nothing left to report to
        let _ = write.ack.send(result);
    }
    debug!("Audit write queue drained");
}

async fn persist_with_retry(
    persister: &dyn AuditPersister,
    entry: &AuditLogEntry,
    retry: &RetryPolicy,
) -> Result<()> {
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match persister.append(entry).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= max_attempts => {
                return Err(AuditError::RetriesExhausted {
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                let delay = retry.delay_for(attempt);
                warn!(
                    entry_id = %entry.id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying audit write"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[async_trait]
impl AuditPersister for QueuedPersister {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        let (ack, done) = oneshot::channel();
        let write = QueuedWrite {
            entry: entry.clone(),
            ack,
        };

        self.sender
            .send_timeout(write, self.enqueue_timeout)
            .await
            .map_err(|e| match e {
                mpsc::error::SendTimeoutError::Timeout(_) => AuditError::QueueFull,
                mpsc::error::SendTimeoutError::Closed(_) => AuditError::QueueClosed,
            })?;

        done.await.map_err(|_| AuditError::QueueClosed)?
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>> {
        self.inner.query(filter).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }
}
