//! Messages pushed to live feed subscribers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{Event, Stats};

/// One message on the live activity feed.
///
/// Every accepted mutation produces an [`FeedMessage::Event`] immediately
/// followed by a [`FeedMessage::Stats`] carrying the refreshed counters. A
/// subscriber additionally receives one `Stats` snapshot and one
/// `Connected` acknowledgment when it attaches, before any live messages.
///
/// Serialized as `{"type": "event" | "stats" | "connected", "data": ...}`,
/// with `data` omitted for `Connected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum FeedMessage {
    /// An accepted, amended, or deleted ledger event.
    Event(Event),
    /// Refreshed global counters.
    Stats(Stats),
    /// Subscription acknowledgment, sent once per subscriber.
    Connected,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::enums::EventKind;
    use crate::ids::{EventId, PointTypeId, UserId};

    #[test]
    fn event_message_is_adjacently_tagged() {
        let message = FeedMessage::Event(Event {
            id: EventId::new(),
            user_id: UserId::new("u-1"),
            point_id: PointTypeId::new("gold"),
            kind: EventKind::Add,
            amount: 5,
            timestamp: Utc::now(),
        });

        let value = serde_json::to_value(&message).unwrap_or_default();
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("event"));
        assert!(value.get("data").is_some());
    }

    #[test]
    fn connected_message_has_no_data() {
        let value = serde_json::to_value(&FeedMessage::Connected).unwrap_or_default();
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("connected"));
        assert!(value.get("data").is_none());
    }

    #[test]
    fn stats_message_roundtrips() {
        let message = FeedMessage::Stats(Stats {
            users: 3,
            events: 9,
            points: 2,
        });
        let json = serde_json::to_string(&message).ok();
        let restored: Result<FeedMessage, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(message));
    }
}
