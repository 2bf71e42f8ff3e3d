//! Local-only document used when the replicated document cannot be opened.

use super::{
    ChangeObserver, ObserverHandle, OrderedCollection, Record, ReplicaError, ReplicatedDocument, ReplicatedMap,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Same surface as [`super::LoroReplica`], but nothing can be exchanged with peers.
#[derive(Debug, Default, Clone)]
pub struct MemoryReplica {
    collections: HashMap<String, Vec<(String, Record)>>,
    maps: HashMap<String, Record>,
}

impl MemoryReplica {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplicatedDocument for MemoryReplica {
    fn ordered_collection(&mut self, name: &str) -> Box<dyn OrderedCollection + '_> {
        Box::new(MemoryCollection {
            entries: self.collections.entry(name.to_string()).or_default(),
        })
    }

    fn map(&mut self, name: &str) -> Box<dyn ReplicatedMap + '_> {
        Box::new(MemoryMap {
            entries: self.maps.entry(name.to_string()).or_default(),
        })
    }

    fn observe(&mut self, _observer: ChangeObserver) -> ObserverHandle {
        ObserverHandle::inert()
    }

    fn commit(&mut self) {}

    fn export_snapshot(&self) -> Result<Vec<u8>, ReplicaError> {
        Err(ReplicaError::Unsupported("export"))
    }

    fn export_updates(&self, _since: &[u8]) -> Result<Vec<u8>, ReplicaError> {
        Err(ReplicaError::Unsupported("export"))
    }

    fn version(&self) -> Vec<u8> {
        Vec::new()
    }

    fn import(&mut self, _bytes: &[u8]) -> Result<(), ReplicaError> {
        Err(ReplicaError::Unsupported("import"))
    }

    fn is_replicated(&self) -> bool {
        false
    }
}

struct MemoryCollection<'a> {
    entries: &'a mut Vec<(String, Record)>,
}

impl OrderedCollection for MemoryCollection<'_> {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn records(&self) -> Vec<Record> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|(id, _)| seen.insert(id.as_str()))
            .map(|(_, record)| record.clone())
            .collect()
    }

    fn get(&self, id: &str) -> Option<Record> {
        self.entries.iter().find(|(other, _)| other == id).map(|(_, r)| r.clone())
    }

    fn insert(&mut self, index: usize, id: &str, record: &Record) -> Result<(), ReplicaError> {
        if self.entries.iter().any(|(other, _)| other == id) {
            return Err(ReplicaError::DuplicateRecord(id.to_string()));
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, (id.to_string(), record.clone()));
        Ok(())
    }

    fn update(&mut self, id: &str, fields: &Record) -> Result<bool, ReplicaError> {
        let Some((_, record)) = self.entries.iter_mut().find(|(other, _)| other == id) else {
            return Ok(false);
        };
        for (key, value) in fields {
            record.insert(key.clone(), value.clone());
        }
        Ok(true)
    }

    fn remove(&mut self, id: &str) -> Result<bool, ReplicaError> {
        let before = self.entries.len();
        self.entries.retain(|(other, _)| other != id);
        Ok(self.entries.len() != before)
    }
}

struct MemoryMap<'a> {
    entries: &'a mut Record,
}

impl ReplicatedMap for MemoryMap<'_> {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), ReplicaError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), ReplicaError> {
        self.entries.remove(key);
        Ok(())
    }

    fn entries(&self) -> Vec<(String, Value)> {
        self.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
