//! Room addressing from the page URL.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Query parameter naming a shared room.
pub const ROOM_PARAM: &str = "room";

/// Identity of a drawing room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `?room=<id>` when present and non-empty, otherwise `local-<path segments
    /// joined by '-'>`, or `local` for the root path.
    pub fn from_url(url: &Url) -> Self {
        let room = url
            .query_pairs()
            .find(|(k, v)| k == ROOM_PARAM && !v.is_empty())
            .map(|(_, v)| v.into_owned());
        if let Some(room) = room {
            return Self(room);
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        if segments.is_empty() {
            Self("local".to_string())
        } else {
            Self(format!("local-{}", segments.join("-")))
        }
    }

    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::from_url(&Url::parse(url)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Persistence key for this room's offline document.
    pub fn storage_key(&self, namespace: &str) -> String {
        format!("{namespace}-{}", self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_from_query() {
        let room = RoomId::parse("https://example.com/course/7?room=abc123&x=1").unwrap();
        assert_eq!(room.as_str(), "abc123");
    }

    #[test]
    fn test_empty_room_param_falls_back_to_path() {
        let room = RoomId::parse("https://example.com/course/7/?room=").unwrap();
        assert_eq!(room.as_str(), "local-course-7");
    }

    #[test]
    fn test_root_path_is_local() {
        assert_eq!(RoomId::parse("https://example.com/").unwrap().as_str(), "local");
        assert_eq!(RoomId::parse("https://example.com").unwrap().as_str(), "local");
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(RoomId::new("abc").storage_key("inkroom"), "inkroom-abc");
    }
}
