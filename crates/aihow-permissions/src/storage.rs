//! Storage integration for permission grants
//!
//! The store itself is in-memory; a repository persists its snapshot so grants
//! survive restarts.

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::{error::Result, store::GrantSnapshot};

/// Repository trait for storing and retrieving grant snapshots
pub trait GrantRepository: Send + Sync {
    /// Load the last saved snapshot (empty if none was saved)
    fn load_grants(&self) -> Result<GrantSnapshot>;

    /// Save a snapshot, replacing the previous one
    fn save_grants(&self, snapshot: &GrantSnapshot) -> Result<()>;
}

/// JSON file repository
pub struct FileGrantRepository {
    path: PathBuf,
}

impl FileGrantRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Repository at `<base>/grants.json`
    pub fn with_defaults<P: AsRef<Path>>(base_path: P) -> Self {
        Self::new(base_path.as_ref().join("grants.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GrantRepository for FileGrantRepository {
    fn load_grants(&self) -> Result<GrantSnapshot> {
        if !self.path.exists() {
            return Ok(GrantSnapshot::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_grants(&self, snapshot: &GrantSnapshot) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        // Write to a uniquely named sibling, then rename over the target
        let content = serde_json::to_string_pretty(snapshot)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// In-memory repository (for testing)
#[derive(Default)]
pub struct InMemoryGrantRepository {
    snapshot: RwLock<GrantSnapshot>,
}

impl InMemoryGrantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GrantRepository for InMemoryGrantRepository {
    fn load_grants(&self) -> Result<GrantSnapshot> {
        Ok(self.snapshot.read().clone())
    }

    fn save_grants(&self, snapshot: &GrantSnapshot) -> Result<()> {
        *self.snapshot.write() = snapshot.clone();
        Ok(())
    }
}
