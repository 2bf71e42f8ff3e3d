//! Storage abstraction for persistence.
//!
//! Values are opaque byte blobs under string keys: the offline document
//! snapshot lives under `"<namespace>-<room>"` and the device id under
//! `"<namespace>-device-id"`.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutoSave, DEFAULT_AUTOSAVE_INTERVAL_MS};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Key/value persistence backend.
///
/// Implementations can store blobs in memory, on the filesystem or in a
/// browser store provided by the host.
pub trait Storage: Send + Sync {
    fn save(&self, key: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>>;

    /// Fails with [`StorageError::NotFound`] for missing keys.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Vec<u8>>>;

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// `Ok(None)` for missing keys, other errors unchanged.
pub async fn load_optional(storage: &dyn Storage, key: &str) -> StorageResult<Option<Vec<u8>>> {
    match storage.load(key).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}
