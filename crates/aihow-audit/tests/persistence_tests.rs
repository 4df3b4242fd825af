//! Integration tests for the file and queued persisters

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aihow_audit::{
    AuditBackend, AuditConfig, AuditError, AuditEvent, AuditFilter, AuditLogEntry, AuditLogger,
    AuditMetadata, AuditPersister, AuditStatus, MemoryPersister, QueueConfig, QueuedPersister,
    Result, RetryPolicy,
};
use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::{Notify, Semaphore};

fn entry(admin_id: &str) -> AuditLogEntry {
    AuditLogEntry::new(
        AuditEvent::new(admin_id, "update", "tools", AuditMetadata::now("ip", "ua")),
        AuditStatus::Success,
        "c".to_string(),
    )
}

fn fast_queue(max_attempts: u32) -> QueueConfig {
    QueueConfig {
        enabled: true,
        capacity: 8,
        enqueue_timeout_ms: 1_000,
        retry: RetryPolicy {
            max_attempts,
            initial_delay_ms: 1,
            backoff_factor: 2.0,
            max_delay_ms: 10,
        },
    }
}

/// Fails the first `failures` appends, then delegates to memory
struct FlakyPersister {
    failures: u32,
    attempts: AtomicU32,
    inner: MemoryPersister,
}

impl FlakyPersister {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            attempts: AtomicU32::new(0),
            inner: MemoryPersister::new(),
        }
    }
}

#[async_trait]
impl AuditPersister for FlakyPersister {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(AuditError::Storage {
                message: format!("transient failure {}", attempt),
            });
        }
        self.inner.append(entry).await
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>> {
        self.inner.query(filter).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }
}

/// Blocks every append until permits are released
struct GatedPersister {
    started: Notify,
    gate: Semaphore,
    inner: MemoryPersister,
}

#[async_trait]
impl AuditPersister for GatedPersister {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        self.started.notify_one();
        let permit = self.gate.acquire().await.map_err(|_| AuditError::QueueClosed)?;
        permit.forget();
        self.inner.append(entry).await
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>> {
        self.inner.query(filter).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }
}

#[tokio::test]
async fn test_queue_retries_transient_failures() {
    let flaky = Arc::new(FlakyPersister::new(2));
    let queued = QueuedPersister::spawn(flaky.clone(), &fast_queue(3));

    queued.append(&entry("a1")).await.unwrap();

    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(queued.query(&AuditFilter::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_queue_reports_exhausted_retries() {
    let flaky = Arc::new(FlakyPersister::new(u32::MAX));
    let queued = QueuedPersister::spawn(flaky.clone(), &fast_queue(3));

    let err = queued.append(&entry("a1")).await.unwrap_err();
    match err {
        AuditError::RetriesExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, AuditError::Storage { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_logger_fails_closed_through_queue() {
    let flaky = Arc::new(FlakyPersister::new(u32::MAX));
    let logger = AuditLogger::new(Arc::new(QueuedPersister::spawn(flaky, &fast_queue(2))));

    let result = logger
        .log_success(AuditEvent::new(
            "a1",
            "update",
            "tools",
            AuditMetadata::now("ip", "ua"),
        ))
        .await;

    assert!(matches!(result, Err(AuditError::LoggingFailed(_))));
}

#[tokio::test]
async fn test_full_queue_times_out() {
    let gated = Arc::new(GatedPersister {
        started: Notify::new(),
        gate: Semaphore::new(0),
        inner: MemoryPersister::new(),
    });
    let config = QueueConfig {
        enabled: true,
        capacity: 1,
        enqueue_timeout_ms: 50,
        retry: RetryPolicy::default(),
    };
    let queued = Arc::new(QueuedPersister::spawn(gated.clone(), &config));

    // First write occupies the worker
    let first = {
        let queued = Arc::clone(&queued);
        tokio::spawn(async move { queued.append(&entry("a1")).await })
    };
    gated.started.notified().await;

    // Second write fills the single channel slot
    let second = {
        let queued = Arc::clone(&queued);
        tokio::spawn(async move { queued.append(&entry("a2")).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let third = queued.append(&entry("a3")).await;
    assert!(matches!(third, Err(AuditError::QueueFull)));

    gated.gate.add_permits(10);
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert_eq!(gated.inner.len().await, 2);
}

#[tokio::test]
async fn test_file_backed_logger_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = AuditConfig {
        backend: AuditBackend::File,
        file_path: Some(dir.path().join("audit").join("admin.jsonl")),
        console_output: false,
        queue: fast_queue(3),
    };

    let written = {
        let logger = AuditLogger::from_config(&config).await.unwrap();
        logger
            .log_failure(
                AuditEvent::new("a1", "delete", "users/9", AuditMetadata::now("ip", "ua")),
                "cannot delete self",
                Some("FORBIDDEN"),
            )
            .await
            .unwrap()
    };

    let reopened = AuditLogger::from_config(&config).await.unwrap();
    let logs = reopened.get_audit_logs(&AuditFilter::new()).await.unwrap();
    assert_eq!(logs, vec![written]);
}
