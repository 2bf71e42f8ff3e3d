//! Replicated document abstraction and its Loro-backed implementation.
//!
//! # Schema
//!
//! ```text
//! LoroDoc
//! ├── "elements": LoroMap<ElementId, LoroMap>   (one map per element, one entry per field)
//! ├── "order":    LoroList<String>              (element ids, back to front)
//! ├── "meta":     LoroMap                       (camera "x", "y", "z")
//! └── "presence": LoroMap<DeviceId, LoroMap>    (one entry per peer, written only by that peer)
//! ```
//!
//! Records are the JSON form of an element (`serde_json::Map`). Scalars become
//! Loro values, arrays and objects become nested containers.

mod convert;
mod loro_replica;
mod memory;

pub use convert::{element_from_record, element_to_record, json_from_loro};
pub use loro_replica::LoroReplica;
pub use memory::MemoryReplica;

use crate::events::ChangeOrigin;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

/// Key for the element collection.
pub const ELEMENTS_KEY: &str = "elements";
/// Key for the element order list.
pub const ORDER_KEY: &str = "order";
/// Key for document metadata (camera).
pub const META_KEY: &str = "meta";
/// Key for the presence map.
pub const PRESENCE_KEY: &str = "presence";

/// One element as a JSON object.
pub type Record = serde_json::Map<String, Value>;

/// Called after the document changed, with the origin of the change.
pub type ChangeObserver = Arc<dyn Fn(ChangeOrigin) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ReplicaError {
    #[error("crdt error: {0}")]
    Loro(#[from] loro::LoroError),
    #[error("failed to encode document: {0}")]
    Encode(String),
    #[error("{0} is not supported by a local-only document")]
    Unsupported(&'static str),
    #[error("record {0} already exists")]
    DuplicateRecord(String),
}

/// Keeps an observer registered; dropping it unsubscribes.
pub struct ObserverHandle(Option<Box<dyn Any>>);

impl ObserverHandle {
    pub(crate) fn new(inner: impl Any) -> Self {
        Self(Some(Box::new(inner)))
    }

    /// Handle for documents that never emit changes.
    pub fn inert() -> Self {
        Self(None)
    }

    pub fn is_active(&self) -> bool {
        self.0.is_some()
    }
}

impl std::fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObserverHandle").field(&self.is_active()).finish()
    }
}

/// Ordered, id-keyed records with field-level updates.
pub trait OrderedCollection {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records in order. Duplicate ids keep their first position; ids with
    /// no record are skipped.
    fn records(&self) -> Vec<Record>;

    fn get(&self, id: &str) -> Option<Record>;

    fn insert(&mut self, index: usize, id: &str, record: &Record) -> Result<(), ReplicaError>;

    /// Overwrite only the given fields. Returns false for unknown ids.
    fn update(&mut self, id: &str, fields: &Record) -> Result<bool, ReplicaError>;

    fn remove(&mut self, id: &str) -> Result<bool, ReplicaError>;
}

/// Last-writer-wins map of JSON values.
pub trait ReplicatedMap {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: &Value) -> Result<(), ReplicaError>;
    fn delete(&mut self, key: &str) -> Result<(), ReplicaError>;
    fn entries(&self) -> Vec<(String, Value)>;
}

/// A document that may be shared between peers.
pub trait ReplicatedDocument {
    fn ordered_collection(&mut self, name: &str) -> Box<dyn OrderedCollection + '_>;

    fn map(&mut self, name: &str) -> Box<dyn ReplicatedMap + '_>;

    /// Register for change notifications. Only imports report [`ChangeOrigin::Remote`].
    fn observe(&mut self, observer: ChangeObserver) -> ObserverHandle;

    /// Close the current transaction.
    fn commit(&mut self);

    fn export_snapshot(&self) -> Result<Vec<u8>, ReplicaError>;

    /// Updates since an encoded version (see [`ReplicatedDocument::version`]).
    fn export_updates(&self, since: &[u8]) -> Result<Vec<u8>, ReplicaError>;

    /// Encoded version vector.
    fn version(&self) -> Vec<u8>;

    fn import(&mut self, bytes: &[u8]) -> Result<(), ReplicaError>;

    /// False for the local-only fallback.
    fn is_replicated(&self) -> bool;
}
