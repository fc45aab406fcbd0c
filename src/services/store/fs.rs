use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::services::store::{ConfigStore, StoreError, StoreResult, validate_key};

/// Filesystem-backed config store. Each namespace is a directory under the
/// configured root; each key is a file inside it.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ConfigStore for FsStore {
    fn backend_name(&self) -> &'static str {
        "fs"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.resolve(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn ensure_namespace(&self, namespace: &str) -> StoreResult<()> {
        validate_key(namespace)?;
        tokio::fs::create_dir_all(self.root.join(namespace))
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl FsStore {
    pub fn root(&self) -> &Path {
        &self.root
    }
}
