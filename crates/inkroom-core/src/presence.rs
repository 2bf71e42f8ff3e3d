//! Ephemeral per-peer presence (cursor position, name, color).

use crate::elements::SerializableColor;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default age after which a peer's entry is hidden.
pub const DEFAULT_PRESENCE_TIMEOUT_MS: u64 = 30_000;

/// One peer's entry in the shared presence map. Each peer only writes its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    pub id: String,
    pub color: SerializableColor,
    pub name: String,
    /// World position, `None` when the pointer is outside the canvas.
    #[serde(default)]
    pub point: Option<Point>,
    #[serde(default)]
    pub last_seen: u64,
}

impl Presence {
    pub fn is_stale(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_seen) > timeout_ms
    }
}

/// Remote peers worth drawing: not us and recently seen, sorted by id.
pub fn visible_peers(
    entries: impl IntoIterator<Item = Presence>,
    self_id: &str,
    now_ms: u64,
    timeout_ms: u64,
) -> Vec<Presence> {
    let mut peers: Vec<Presence> = entries
        .into_iter()
        .filter(|p| p.id != self_id && !p.is_stale(now_ms, timeout_ms))
        .collect();
    peers.sort_by(|a, b| a.id.cmp(&b.id));
    peers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn peer(id: &str, last_seen: u64) -> Presence {
        Presence {
            id: id.to_string(),
            color: SerializableColor::rgb(1, 2, 3),
            name: id.to_uppercase(),
            point: Some(Point::new(1.0, 2.0)),
            last_seen,
        }
    }

    #[test]
    fn test_visible_peers_filters_self_and_stale() {
        let entries = vec![peer("me", 1000), peer("b", 1000), peer("a", 900), peer("old", 10)];
        let peers = visible_peers(entries, "me", 1000, 500);
        let ids: Vec<&str> = peers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_presence_json_shape() {
        let mut p = peer("x", 5);
        p.point = None;
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(
            value,
            json!({ "id": "x", "color": "#010203", "name": "X", "point": null, "lastSeen": 5 })
        );
    }
}
