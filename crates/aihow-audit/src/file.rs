//! JSON-lines file persistence

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::filter::AuditFilter;
use crate::models::AuditLogEntry;
use crate::persister::AuditPersister;

/// Appends one JSON object per line to a single audit file
pub struct JsonlFilePersister {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlFilePersister {
    /// Open (or prepare to create) the audit file, creating parent directories
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        debug!(path = %path.display(), "Opened audit log file");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditPersister for JsonlFilePersister {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut json_line = serde_json::to_string(entry)? + "\n";

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        // A torn write leaves a partial last line; start a fresh one after it
        if file.metadata().await?.len() > 0 {
            file.seek(SeekFrom::End(-1)).await?;
            let mut last = [0u8; 1];
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                warn!(path = %self.path.display(), "Audit log ends with a partial line");
                json_line.insert(0, '\n');
            }
        }

        file.write_all(json_line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut results = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditLogEntry>(line) {
                Ok(entry) => {
                    if filter.matches(&entry) {
                        results.push(entry);
                    }
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line = line_no + 1,
                        error = %e,
                        "Skipping malformed audit log line"
                    );
                }
            }
        }

        Ok(results)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => {
                tokio::fs::write(&self.path, b"").await?;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
