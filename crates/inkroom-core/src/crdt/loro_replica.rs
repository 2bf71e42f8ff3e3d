//! Loro-backed replicated document.

use super::convert::{json_from_loro, record_from_loro, update_field, write_field};
use super::{
    ChangeObserver, ELEMENTS_KEY, ORDER_KEY, ObserverHandle, OrderedCollection, Record, ReplicaError,
    ReplicatedDocument, ReplicatedMap,
};
use crate::events::ChangeOrigin;
use loro::event::DiffEvent;
use loro::{
    Container, EventTriggerKind, ExportMode, LoroDoc, LoroList, LoroMap, LoroValue, ValueOrContainer,
    VersionVector,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// A CRDT document shared between peers through exported updates.
pub struct LoroReplica {
    doc: LoroDoc,
}

impl Default for LoroReplica {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoroReplica {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoroReplica")
            .field("peer", &self.doc.peer_id())
            .finish()
    }
}

impl LoroReplica {
    pub fn new() -> Self {
        Self { doc: LoroDoc::new() }
    }

    /// Restore a replica from an exported snapshot.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, ReplicaError> {
        let replica = Self::new();
        replica.doc.import(bytes)?;
        Ok(replica)
    }

    /// Get the underlying LoroDoc.
    pub fn loro_doc(&self) -> &LoroDoc {
        &self.doc
    }

    fn order_key(name: &str) -> String {
        if name == ELEMENTS_KEY {
            ORDER_KEY.to_string()
        } else {
            format!("{name}_{ORDER_KEY}")
        }
    }
}

impl ReplicatedDocument for LoroReplica {
    fn ordered_collection(&mut self, name: &str) -> Box<dyn OrderedCollection + '_> {
        Box::new(LoroCollection {
            records: self.doc.get_map(name),
            order: self.doc.get_list(Self::order_key(name).as_str()),
        })
    }

    fn map(&mut self, name: &str) -> Box<dyn ReplicatedMap + '_> {
        Box::new(LoroMapHandle {
            map: self.doc.get_map(name),
        })
    }

    fn observe(&mut self, observer: ChangeObserver) -> ObserverHandle {
        let subscription = self.doc.subscribe_root(Arc::new(move |event: DiffEvent<'_>| {
            let origin = match event.triggered_by {
                EventTriggerKind::Import => ChangeOrigin::Remote,
                _ => ChangeOrigin::Local,
            };
            observer(origin);
        }));
        ObserverHandle::new(subscription)
    }

    fn commit(&mut self) {
        self.doc.commit();
    }

    fn export_snapshot(&self) -> Result<Vec<u8>, ReplicaError> {
        self.doc
            .export(ExportMode::Snapshot)
            .map_err(|e| ReplicaError::Encode(e.to_string()))
    }

    fn export_updates(&self, since: &[u8]) -> Result<Vec<u8>, ReplicaError> {
        let vv = if since.is_empty() {
            VersionVector::default()
        } else {
            VersionVector::decode(since)?
        };
        self.doc
            .export(ExportMode::updates(&vv))
            .map_err(|e| ReplicaError::Encode(e.to_string()))
    }

    fn version(&self) -> Vec<u8> {
        self.doc.oplog_vv().encode()
    }

    fn import(&mut self, bytes: &[u8]) -> Result<(), ReplicaError> {
        self.doc.import(bytes)?;
        Ok(())
    }

    fn is_replicated(&self) -> bool {
        true
    }
}

struct LoroCollection {
    records: LoroMap,
    order: LoroList,
}

impl LoroCollection {
    fn ids(&self) -> Vec<String> {
        match self.order.get_deep_value() {
            LoroValue::List(items) => items
                .iter()
                .filter_map(|v| match v {
                    LoroValue::String(s) => Some(s.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn record_map(&self, id: &str) -> Option<LoroMap> {
        match self.records.get(id)? {
            ValueOrContainer::Container(Container::Map(map)) => Some(map),
            _ => None,
        }
    }
}

impl OrderedCollection for LoroCollection {
    fn len(&self) -> usize {
        self.records().len()
    }

    fn records(&self) -> Vec<Record> {
        let LoroValue::Map(all) = self.records.get_deep_value() else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.ids()
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .filter_map(|id| all.get(id.as_str()).and_then(record_from_loro))
            .collect()
    }

    fn get(&self, id: &str) -> Option<Record> {
        record_from_loro(&self.record_map(id)?.get_deep_value())
    }

    fn insert(&mut self, index: usize, id: &str, record: &Record) -> Result<(), ReplicaError> {
        if self.records.get(id).is_some() {
            return Err(ReplicaError::DuplicateRecord(id.to_string()));
        }
        let map = self.records.insert_container(id, LoroMap::new())?;
        for (key, value) in record {
            write_field(&map, key, value)?;
        }
        let index = index.min(self.order.len());
        self.order.insert(index, LoroValue::from(id))?;
        Ok(())
    }

    fn update(&mut self, id: &str, fields: &Record) -> Result<bool, ReplicaError> {
        let Some(map) = self.record_map(id) else {
            return Ok(false);
        };
        for (key, value) in fields {
            update_field(&map, key, value)?;
        }
        Ok(true)
    }

    fn remove(&mut self, id: &str) -> Result<bool, ReplicaError> {
        let existed = self.records.get(id).is_some();
        if existed {
            self.records.delete(id)?;
        }
        let positions: Vec<usize> = self
            .ids()
            .iter()
            .enumerate()
            .filter(|(_, other)| other.as_str() == id)
            .map(|(i, _)| i)
            .collect();
        for i in positions.iter().rev() {
            self.order.delete(*i, 1)?;
        }
        Ok(existed || !positions.is_empty())
    }
}

struct LoroMapHandle {
    map: LoroMap,
}

impl ReplicatedMap for LoroMapHandle {
    fn get(&self, key: &str) -> Option<Value> {
        match self.map.get_deep_value() {
            LoroValue::Map(entries) => entries.get(key).map(json_from_loro),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), ReplicaError> {
        write_field(&self.map, key, value)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), ReplicaError> {
        self.map.delete(key)?;
        Ok(())
    }

    fn entries(&self) -> Vec<(String, Value)> {
        match self.map.get_deep_value() {
            LoroValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| (k.to_string(), json_from_loro(v)))
                .collect(),
            _ => Vec::new(),
        }
    }
}
