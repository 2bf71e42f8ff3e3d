//! Stable per-device identity used for presence.

use crate::elements::SerializableColor;
use crate::storage::{Storage, load_optional};
use uuid::Uuid;

/// Cursor colors handed out to peers.
const PEER_COLORS: [SerializableColor; 8] = [
    SerializableColor::rgb(0xe0, 0x31, 0x31),
    SerializableColor::rgb(0x2f, 0x9e, 0x44),
    SerializableColor::rgb(0x19, 0x71, 0xc2),
    SerializableColor::rgb(0xf0, 0x8c, 0x00),
    SerializableColor::rgb(0x9c, 0x36, 0xb5),
    SerializableColor::rgb(0x0c, 0x85, 0x99),
    SerializableColor::rgb(0xe6, 0x49, 0x80),
    SerializableColor::rgb(0x66, 0xa8, 0x0f),
];

/// This device's presence identity.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalIdentity {
    pub id: String,
    pub name: String,
    pub color: SerializableColor,
}

impl LocalIdentity {
    /// Name and color are derived from the id so every peer agrees on them.
    pub fn from_device_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let hash = id.bytes().fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32));
        let color = PEER_COLORS[hash as usize % PEER_COLORS.len()];
        let short: String = id.chars().filter(|c| c.is_ascii_alphanumeric()).take(4).collect();
        Self {
            name: format!("Guest {}", short.to_uppercase()),
            color,
            id,
        }
    }

    pub fn generate() -> Self {
        Self::from_device_id(Uuid::new_v4().to_string())
    }

    /// Persistence key for the device id.
    pub fn storage_key(namespace: &str) -> String {
        format!("{namespace}-device-id")
    }

    /// Reuse the persisted device id, or create and persist a new one.
    /// Storage failures yield a fresh, unpersisted identity.
    pub async fn load_or_create(storage: &dyn Storage, namespace: &str) -> Self {
        let key = Self::storage_key(namespace);
        match load_optional(storage, &key).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(id) if !id.trim().is_empty() => return Self::from_device_id(id.trim()),
                _ => log::warn!("ignoring malformed device id under {key}"),
            },
            Ok(None) => {}
            Err(err) => {
                log::warn!("could not read device id: {err}");
                return Self::generate();
            }
        }

        let identity = Self::generate();
        if let Err(err) = storage.save(&key, identity.id.as_bytes()).await {
            log::warn!("could not persist device id: {err}");
        }
        identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pollster::block_on;

    #[test]
    fn test_derived_fields_are_stable() {
        let a = LocalIdentity::from_device_id("1b2c3d4e-0000");
        let b = LocalIdentity::from_device_id("1b2c3d4e-0000");
        assert_eq!(a, b);
        assert_eq!(a.name, "Guest 1B2C");
    }

    #[test]
    fn test_load_or_create_persists() {
        let storage = MemoryStorage::new();
        let first = block_on(LocalIdentity::load_or_create(&storage, "inkroom"));
        let second = block_on(LocalIdentity::load_or_create(&storage, "inkroom"));
        assert_eq!(first, second);
        assert!(block_on(storage.exists("inkroom-device-id")).unwrap());
    }

    #[test]
    fn test_namespaces_are_separate() {
        let storage = MemoryStorage::new();
        let a = block_on(LocalIdentity::load_or_create(&storage, "a"));
        let b = block_on(LocalIdentity::load_or_create(&storage, "b"));
        assert_ne!(a.id, b.id);
    }
}
