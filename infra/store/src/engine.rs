use crate::builder::StoreBuilder;
use crate::error::{StoreError, StoreErrorExt};
use crate::maintenance;
use crate::security;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub(crate) const TMP_MARKER: &str = ".zbtmp.";

#[derive(Debug)]
pub(crate) struct StoreInner {
    /// Canonical physical root; every resolved path starts with it.
    pub(crate) root: PathBuf,
    pub(crate) tmp_counter: AtomicU64,
}

/// Cheaply clonable handle to a store root.
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) inner: Arc<StoreInner>,
}

impl Store {
    #[must_use = "The store is not usable until you call .connect()"]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Maps a relative path to its physical location inside the root.
    ///
    /// # Errors
    ///
    /// [`StoreError::PathTraversalAttempt`] for absolute paths or paths escaping
    /// the root, [`StoreError::Io`] when an existing parent cannot be verified.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
        security::resolve_path(&self.inner.root, path)
    }

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// [`StoreError::FileNotFound`] when the file does not exist.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StoreError> {
        let resolved = self.resolve(path)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::FileNotFound {
                message: resolved.display().to_string().into(),
                context: None,
            }),
            Err(err) => Err(StoreError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// Replaces a file atomically.
    ///
    /// The data goes to `<name>.zbtmp.<pid>.<n>` first, is synced, then renamed over
    /// the target; the parent directory is synced afterwards so the rename itself
    /// survives a power loss. Parent directories are created on demand.
    ///
    /// # Errors
    ///
    /// [`StoreError::PathTraversalAttempt`] if the path escapes the root,
    /// [`StoreError::Io`] on any filesystem failure.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StoreError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create parent of {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(&resolved, &self.inner.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display())
                        .into(),
                ),
            });
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "Snapshot replaced");
        Ok(())
    }

    /// Deserializes a JSON document, or returns `T::default()` when the file has
    /// never been written.
    ///
    /// # Errors
    ///
    /// [`StoreError::Json`] when the file exists but does not decode as `T`.
    pub async fn load<T>(&self, path: impl AsRef<Path>) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let path = path.as_ref();
        match self.read(path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).context(format!("Decoding {}", path.display()))
            },
            Err(StoreError::FileNotFound { .. }) => Ok(T::default()),
            Err(err) => Err(err),
        }
    }

    /// Serializes `value` as pretty JSON and replaces the file atomically.
    ///
    /// # Errors
    ///
    /// Same as [`Store::write`], plus [`StoreError::Json`] if serialization fails.
    pub async fn save<T>(&self, path: impl AsRef<Path>, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let path = path.as_ref();
        let bytes = serde_json::to_vec_pretty(value)
            .context(format!("Encoding {}", path.display()))?;
        self.write(path, &bytes).await
    }

    /// # Errors
    ///
    /// Fails only when the path cannot be resolved inside the root.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StoreError> {
        Ok(self.resolve(path)?.exists())
    }

    /// # Errors
    ///
    /// [`StoreError::FileNotFound`] when there is nothing to delete.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let resolved = self.resolve(path)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "File deleted");
                Ok(())
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::FileNotFound {
                message: resolved.display().to_string().into(),
                context: None,
            }),
            Err(err) => Err(StoreError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", resolved.display()).into()),
            }),
        }
    }

    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.inner.root).await;
    }
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => warn!(path = %path.display(), error = %err, "Directory open failed"),
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let n = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("snapshot");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{n}", std::process::id()))
}
