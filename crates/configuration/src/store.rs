use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// The relative-error thresholds shared through the external key/value
/// service. Sigma-mode bounds are session-local and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistedThresholds {
    pub green_upper: f64,
    pub amber_width: f64,
}

/// The contract of the external config persistence service.
///
/// Callers treat every failure as "keep the last valid config"; a broken
/// store must never stop classification.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads the stored thresholds.
    async fn load(&self) -> Result<PersistedThresholds, StoreError>;

    /// Writes the thresholds and echoes back what the store now holds.
    async fn save(&self, values: PersistedThresholds) -> Result<PersistedThresholds, StoreError>;
}

/// A store backed by a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> Result<PersistedThresholds, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(StoreError::Empty),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, values: PersistedThresholds) -> Result<PersistedThresholds, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        // Write-then-rename so a reader never sees a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&values)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), "Persisted thresholds written.");
        self.load().await
    }
}

/// An in-process store. It can be told to fail, which lets callers exercise
/// their fallback path.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: Mutex<Option<PersistedThresholds>>,
    failing: AtomicBool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: PersistedThresholds) -> Self {
        Self {
            values: Mutex::new(Some(values)),
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<PersistedThresholds, StoreError> {
        self.check_available()?;
        let values = *self.values.lock().await;
        values.ok_or(StoreError::Empty)
    }

    async fn save(&self, values: PersistedThresholds) -> Result<PersistedThresholds, StoreError> {
        self.check_available()?;
        let mut guard = self.values.lock().await;
        *guard = Some(values);
        Ok(values)
    }
}
