//! Sync & presence engine: mirrors the scene store into a replicated document,
//! merges remote changes back and persists the offline snapshot.

use crate::camera::Camera;
use crate::config::SyncConfig;
use crate::crdt::{
    ELEMENTS_KEY, LoroReplica, META_KEY, MemoryReplica, ObserverHandle, PRESENCE_KEY, Record, ReplicaError,
    ReplicatedDocument, element_from_record, element_to_record,
};
use crate::elements::{Element, ElementId};
use crate::events::ChangeOrigin;
use crate::identity::LocalIdentity;
use crate::platform::Clock;
use crate::presence::{Presence, visible_peers};
use crate::room::RoomId;
use crate::storage::{AutoSave, Storage, StorageError, load_optional};
use crate::store::SceneStore;
use kurbo::Point;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Replica(#[from] ReplicaError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Bridges one room's replicated document and a [`SceneStore`].
pub struct SyncEngine {
    replica: Box<dyn ReplicatedDocument>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    identity: LocalIdentity,
    storage_key: String,
    presence_timeout_ms: u64,
    connected: bool,
    remote_pending: Arc<AtomicBool>,
    _observer: ObserverHandle,
    /// Element records as last written to or read from the replica.
    mirrored: HashMap<ElementId, Record>,
    last_revision: Option<u64>,
    last_camera_revision: Option<u64>,
    peers: Vec<Presence>,
    autosave: AutoSave,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("storage_key", &self.storage_key)
            .field("connected", &self.connected)
            .field("peers", &self.peers.len())
            .finish()
    }
}

impl SyncEngine {
    /// Open `room`, restoring its offline snapshot. Never fails: when the
    /// snapshot cannot be read or decoded the engine runs local-only.
    pub async fn open(config: &SyncConfig, room: &RoomId, storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        let identity = LocalIdentity::load_or_create(storage.as_ref(), &config.namespace).await;
        let storage_key = room.storage_key(&config.namespace);

        let replica: Box<dyn ReplicatedDocument> = match load_optional(storage.as_ref(), &storage_key).await {
            Ok(Some(bytes)) => match LoroReplica::from_snapshot(&bytes) {
                Ok(replica) => {
                    log::info!("restored room {room} ({} bytes)", bytes.len());
                    Box::new(replica)
                }
                Err(err) => {
                    log::warn!("snapshot for {room} is unreadable, working offline: {err}");
                    Box::new(MemoryReplica::new())
                }
            },
            Ok(None) => {
                log::info!("new room {room}");
                Box::new(LoroReplica::new())
            }
            Err(err) => {
                log::warn!("persistence unavailable for {room}, working offline: {err}");
                Box::new(MemoryReplica::new())
            }
        };

        Self::with_replica(replica, identity, storage, clock, config, storage_key)
    }

    pub fn with_replica(
        mut replica: Box<dyn ReplicatedDocument>,
        identity: LocalIdentity,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        config: &SyncConfig,
        storage_key: String,
    ) -> Self {
        let remote_pending = Arc::new(AtomicBool::new(false));
        let flag = remote_pending.clone();
        let observer = replica.observe(Arc::new(move |origin| {
            if origin == ChangeOrigin::Remote {
                flag.store(true, Ordering::SeqCst);
            }
        }));
        let connected = replica.is_replicated();

        Self {
            replica,
            storage,
            clock,
            identity,
            storage_key,
            presence_timeout_ms: config.presence_timeout_ms,
            connected,
            remote_pending,
            _observer: observer,
            mirrored: HashMap::new(),
            last_revision: None,
            last_camera_revision: None,
            peers: Vec::new(),
            autosave: AutoSave::new(config.autosave_interval_ms),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Remote peers from the last poll.
    pub fn peers(&self) -> &[Presence] {
        &self.peers
    }

    fn materialize(&mut self) -> Vec<(Element, Record)> {
        self.replica
            .ordered_collection(ELEMENTS_KEY)
            .records()
            .into_iter()
            .filter_map(|record| element_from_record(&record).map(|el| (el, record)))
            .collect()
    }

    fn adopt(&mut self, store: &mut SceneStore, materialized: Vec<(Element, Record)>) {
        self.mirrored = materialized
            .iter()
            .map(|(el, record)| (el.id(), record.clone()))
            .collect();
        let elements = materialized.into_iter().map(|(el, _)| el).collect();
        store.replace_elements(elements, ChangeOrigin::Remote);
        self.last_revision = Some(store.revision());
    }

    fn stored_camera(&mut self) -> Option<Camera> {
        let meta = self.replica.map(META_KEY);
        let field = |key: &str| meta.get(key).and_then(|v| v.as_f64());
        Some(Camera::new(field("x")?, field("y")?, field("z")?))
    }

    /// Load elements and camera from the replica into `store` and announce ourselves.
    pub fn hydrate(&mut self, store: &mut SceneStore) {
        let materialized = self.materialize();
        log::debug!("hydrating {} elements", materialized.len());
        self.adopt(store, materialized);
        store.reset_history();

        if let Some(camera) = self.stored_camera() {
            store.set_camera(camera);
        }
        self.last_camera_revision = Some(store.camera_revision());
        store.set_collab_connected(self.connected);

        if let Err(err) = self.update_presence(store.pointer()) {
            log::warn!("could not publish presence: {err}");
        }
        self.refresh_peers();
    }

    /// Mirror local store changes into the replica. Returns true if anything was written.
    pub fn flush_local(&mut self, store: &SceneStore) -> Result<bool, ReplicaError> {
        let elements_dirty = self.last_revision != Some(store.revision());
        let camera_dirty = self.last_camera_revision != Some(store.camera_revision());
        if !elements_dirty && !camera_dirty {
            return Ok(false);
        }

        if elements_dirty {
            let current: Vec<(ElementId, Record)> = store
                .elements()
                .iter()
                .map(|el| (el.id(), element_to_record(el)))
                .collect();
            let mut collection = self.replica.ordered_collection(ELEMENTS_KEY);

            for id in self.mirrored.keys() {
                if !current.iter().any(|(cid, _)| cid == id) {
                    collection.remove(&id.to_string())?;
                }
            }
            for (index, (id, record)) in current.iter().enumerate() {
                match self.mirrored.get(id) {
                    None => collection.insert(index, &id.to_string(), record)?,
                    Some(previous) if previous != record => {
                        let changed: Record = record
                            .iter()
                            .filter(|(k, v)| previous.get(*k) != Some(*v))
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect();
                        collection.update(&id.to_string(), &changed)?;
                    }
                    Some(_) => {}
                }
            }
            drop(collection);
            self.mirrored = current.into_iter().collect();
        }

        if camera_dirty {
            let camera = store.camera();
            let mut meta = self.replica.map(META_KEY);
            meta.set("x", &Value::from(camera.x))?;
            meta.set("y", &Value::from(camera.y))?;
            meta.set("z", &Value::from(camera.z))?;
        }

        self.replica.commit();
        self.last_revision = Some(store.revision());
        self.last_camera_revision = Some(store.camera_revision());
        self.autosave.mark_dirty();
        Ok(true)
    }

    /// Write this peer's presence entry. Other peers' entries are never touched.
    pub fn update_presence(&mut self, point: Option<Point>) -> Result<(), ReplicaError> {
        let presence = Presence {
            id: self.identity.id.clone(),
            color: self.identity.color,
            name: self.identity.name.clone(),
            point,
            last_seen: self.clock.now_ms(),
        };
        let value = serde_json::to_value(&presence).map_err(|e| ReplicaError::Encode(e.to_string()))?;
        self.replica.map(PRESENCE_KEY).set(&presence.id, &value)?;
        self.replica.commit();
        Ok(())
    }

    /// Remove this peer's presence entry.
    pub fn leave(&mut self) -> Result<(), ReplicaError> {
        self.replica.map(PRESENCE_KEY).delete(&self.identity.id)?;
        self.replica.commit();
        Ok(())
    }

    /// Import updates from a peer. The merge into the store happens in [`Self::poll_remote`].
    pub fn apply_remote(&mut self, bytes: &[u8]) -> Result<(), ReplicaError> {
        self.replica.import(bytes)?;
        self.remote_pending.store(true, Ordering::SeqCst);
        self.autosave.mark_dirty();
        Ok(())
    }

    /// Merge pending remote changes into `store` and refresh the peer list.
    /// Returns true when elements were re-materialized.
    pub fn poll_remote(&mut self, store: &mut SceneStore) -> bool {
        self.refresh_peers();
        if !self.remote_pending.swap(false, Ordering::SeqCst) {
            return false;
        }
        // Local edits not yet mirrored would be overwritten by the merge.
        if let Err(err) = self.flush_local(store) {
            log::warn!("flush before merge failed: {err}");
        }
        let materialized = self.materialize();
        log::debug!("merged remote changes, {} elements", materialized.len());
        self.adopt(store, materialized);
        true
    }

    fn refresh_peers(&mut self) {
        let entries: Vec<Presence> = self
            .replica
            .map(PRESENCE_KEY)
            .entries()
            .into_iter()
            .filter_map(|(_, value)| serde_json::from_value(value).ok())
            .collect();
        self.peers = visible_peers(entries, &self.identity.id, self.clock.now_ms(), self.presence_timeout_ms);
    }

    pub fn export_snapshot(&self) -> Result<Vec<u8>, ReplicaError> {
        self.replica.export_snapshot()
    }

    pub fn export_updates(&self, since: &[u8]) -> Result<Vec<u8>, ReplicaError> {
        self.replica.export_updates(since)
    }

    pub fn version(&self) -> Vec<u8> {
        self.replica.version()
    }

    pub fn needs_persist(&self) -> bool {
        self.autosave.is_dirty()
    }

    /// Write the snapshot now. A local-only document has nothing to write.
    pub async fn persist(&mut self) -> Result<(), SyncError> {
        if !self.connected {
            return Ok(());
        }
        let bytes = self.replica.export_snapshot()?;
        self.storage.save(&self.storage_key, &bytes).await?;
        self.autosave.mark_saved(self.clock.now_ms());
        log::info!("persisted {} ({} bytes)", self.storage_key, bytes.len());
        Ok(())
    }

    /// Persist if dirty and the autosave interval elapsed.
    pub async fn maybe_persist(&mut self) -> Result<bool, SyncError> {
        if !self.connected || !self.autosave.should_save(self.clock.now_ms()) {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }
}
