//! Config store interface used by the authority bootstrap (provider record,
//! relying-party registrations).

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer errors. "Not found" is not an error: `get` returns `Ok(None)`
/// so callers can treat absence as a normal first-boot condition.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(String),
    #[error("invalid store key: {0}")]
    InvalidKey(String),
}

/// A minimal durable key/value interface.
///
/// Keys are relative `namespace/name` paths. The surface is intentionally
/// small: the bootstrap only needs `get` + `put` and namespace creation.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait ConfigStore: Clone + Send + Sync + 'static {
    // Returns the store backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Fetch the raw bytes at `key`, or `None` if nothing is stored there.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    // Write `bytes` at `key`, overwriting any previous content.
    async fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()>;

    // Make sure a namespace exists; independent and idempotent per namespace.
    async fn ensure_namespace(&self, namespace: &str) -> StoreResult<()>;
}

// Keys come from internal constants, but a filesystem backend still must
// never follow an absolute or parent-escaping path.
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() || Path::new(key).is_absolute() || key.split('/').any(|seg| seg == "..") {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_escaping_keys() {
        assert!(validate_key("op/provider.json").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("op/../../secrets").is_err());
    }
}
