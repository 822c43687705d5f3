//! Filesystem-backed object store with git-style 2-char sharding.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::storage_traits::{ObjectStore, StorageResult};

/// Content-addressed filesystem store.
///
/// The locator returned by `put` is the SHA-256 hex of the stored bytes;
/// identical bundles therefore share one blob on disk.
///
/// Layout: `<root>/objects/<first 2 hex chars>/<remaining hex chars>`
pub struct FsObjectStore {
    objects_dir: PathBuf,
}

impl FsObjectStore {
    /// Create a new `FsObjectStore` rooted at `root`. Creates `root/objects/` if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let objects_dir = root.as_ref().join("objects");
        fs::create_dir_all(&objects_dir)?;
        Ok(Self { objects_dir })
    }

    fn blob_path(&self, locator: &str) -> StorageResult<PathBuf> {
        if locator.len() != 64 || !locator.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::NotFound {
                locator: locator.to_string(),
            });
        }
        Ok(self.objects_dir.join(&locator[..2]).join(&locator[2..]))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, data: &[u8]) -> StorageResult<String> {
        let locator = hex::encode(Sha256::digest(data));
        let path = self.blob_path(&locator)?;

        if path.exists() {
            return Ok(locator);
        }

        let shard_dir = path
            .parent()
            .ok_or_else(|| StorageError::WriteFailed("blob path has no parent".to_string()))?;
        fs::create_dir_all(shard_dir)?;

        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(shard_dir)?;
        tmp.write_all(data)?;
        tmp.persist(&path)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        tracing::debug!(event = "object_store.put", locator = %locator, bytes = data.len());
        Ok(locator)
    }

    async fn presigned_get(&self, locator: &str, ttl: Duration) -> StorageResult<String> {
        let path = self.blob_path(locator)?;
        if !path.exists() {
            return Err(StorageError::NotFound {
                locator: locator.to_string(),
            });
        }
        Ok(format!(
            "file://{}?expires_in={}",
            path.display(),
            ttl.as_secs()
        ))
    }

    async fn delete(&self, locator: &str) -> StorageResult<()> {
        let path = self.blob_path(locator)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
