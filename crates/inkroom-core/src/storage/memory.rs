//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let bytes = bytes.to_vec();
        Box::pin(async move {
            let mut blobs = self.blobs.write().map_err(lock_error)?;
            blobs.insert(key, bytes);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Vec<u8>>> {
        let key = key.to_string();
        Box::pin(async move {
            let blobs = self.blobs.read().map_err(lock_error)?;
            blobs.get(&key).cloned().ok_or(StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut blobs = self.blobs.write().map_err(lock_error)?;
            blobs.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let blobs = self.blobs.read().map_err(lock_error)?;
            Ok(blobs.keys().cloned().collect())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let blobs = self.blobs.read().map_err(lock_error)?;
            Ok(blobs.contains_key(&key))
        })
    }
}
