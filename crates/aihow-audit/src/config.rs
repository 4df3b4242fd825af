//! Audit backend configuration

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AuditError, Result};
use crate::file::JsonlFilePersister;
use crate::persister::{AuditPersister, MemoryPersister};
use crate::queue::{QueueConfig, QueuedPersister};

/// Where audit entries are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub backend: AuditBackend,
    /// Required when `backend` is `file`
    pub file_path: Option<PathBuf>,
    /// Mirror every entry to the tracing subscriber
    pub console_output: bool,
    pub queue: QueueConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: AuditBackend::Memory,
            file_path: None,
            console_output: true,
            queue: QueueConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Check the settings without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.backend == AuditBackend::File && self.file_path.is_none() {
            return Err(AuditError::Config(
                "audit.file_path is required for the file backend".to_string(),
            ));
        }

        if self.queue.enabled {
            if self.queue.capacity == 0 {
                return Err(AuditError::Config(
                    "audit.queue.capacity must be greater than 0".to_string(),
                ));
            }
            if self.queue.retry.max_attempts == 0 {
                return Err(AuditError::Config(
                    "audit.queue.retry.max_attempts must be at least 1".to_string(),
                ));
            }
            if self.queue.retry.backoff_factor < 1.0 {
                return Err(AuditError::Config(
                    "audit.queue.retry.backoff_factor must be at least 1.0".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Build the persister stack described by `config`
///
/// Must be called inside a tokio runtime when the queue is enabled.
pub async fn build_persister(config: &AuditConfig) -> Result<Arc<dyn AuditPersister>> {
    config.validate()?;

    let base: Arc<dyn AuditPersister> = match config.backend {
        AuditBackend::Memory => Arc::new(MemoryPersister::new()),
        AuditBackend::File => {
            let path = config.file_path.clone().ok_or_else(|| {
                AuditError::Config("audit.file_path is required for the file backend".to_string())
            })?;
            Arc::new(JsonlFilePersister::open(path).await?)
        }
    };

    info!(
        backend = ?config.backend,
        queued = config.queue.enabled,
        "Audit persister ready"
    );

    if config.queue.enabled {
        Ok(Arc::new(QueuedPersister::spawn(base, &config.queue)))
    } else {
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::AuditFilter;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_validate() {
        assert!(AuditConfig::default().validate().is_ok());
    }

    #[test]
    fn test_file_backend_requires_path() {
        let config = AuditConfig {
            backend: AuditBackend::File,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::Config(_))));
    }

    #[test]
    fn test_enabled_queue_requires_capacity() {
        let mut config = AuditConfig::default();
        config.queue.enabled = true;
        config.queue.capacity = 0;
        assert!(config.validate().is_err());

        config.queue.capacity = 8;
        config.queue.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AuditConfig =
            serde_json::from_str(r#"{"backend": "file", "file_path": "/tmp/a.jsonl"}"#).unwrap();
        assert_eq!(config.backend, AuditBackend::File);
        assert!(config.console_output);
        assert_eq!(config.queue, QueueConfig::default());
    }

    #[tokio::test]
    async fn test_build_file_persister() {
        let dir = TempDir::new().unwrap();
        let config = AuditConfig {
            backend: AuditBackend::File,
            file_path: Some(dir.path().join("logs").join("audit.jsonl")),
            ..Default::default()
        };

        let persister = build_persister(&config).await.unwrap();
        assert!(persister.query(&AuditFilter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_queued_persister() {
        let mut config = AuditConfig::default();
        config.queue.enabled = true;
        assert!(build_persister(&config).await.is_ok());
    }
}
