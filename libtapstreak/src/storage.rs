//! Highest-streak persistence
//!
//! The store is read once when a feature is built and written when a run
//! ends in failure. Writes are last-writer-wins; there is exactly one
//! writer, the feature's serialized loop.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};

/// Where the best streak lives between processes
pub trait HighScoreStore: Send + Sync {
    fn read(&self) -> Result<u32>;

    fn write(&self, highest_streak: u32) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreFile {
    highest_streak: u32,
}

/// Single JSON document on disk: `{"highest_streak": N}`
///
/// A missing file reads as 0. Writes go to a sibling temp file and are
/// renamed into place, so a reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.resolved_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileStore {
    fn read(&self) -> Result<u32> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::Io(e).into()),
        };
        let file: HighScoreFile = serde_json::from_str(&content).map_err(StorageError::Corrupt)?;
        Ok(file.highest_streak)
    }

    fn write(&self, highest_streak: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let json = serde_json::to_string(&HighScoreFile { highest_streak })
            .map_err(StorageError::Corrupt)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(StorageError::Io)?;
        std::fs::rename(&tmp_path, &self.path).map_err(StorageError::Io)?;
        Ok(())
    }
}

/// In-process store that remembers every write
///
/// Clones share the same value, so a test can keep one clone and hand the
/// other to a feature.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Arc<Mutex<u32>>,
    writes: Arc<Mutex<Vec<u32>>>,
}

impl MemoryStore {
    pub fn new(initial: u32) -> Self {
        Self {
            value: Arc::new(Mutex::new(initial)),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn value(&self) -> u32 {
        *lock(&self.value)
    }

    /// Every value written, oldest first
    pub fn writes(&self) -> Vec<u32> {
        lock(&self.writes).clone()
    }
}

impl HighScoreStore for MemoryStore {
    fn read(&self) -> Result<u32> {
        Ok(self.value())
    }

    fn write(&self, highest_streak: u32) -> Result<()> {
        *lock(&self.value) = highest_streak;
        lock(&self.writes).push(highest_streak);
        Ok(())
    }
}

// A panic elsewhere cannot leave a bare integer half-updated
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
