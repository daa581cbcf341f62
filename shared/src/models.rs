use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Authenticated user identifier. Every store path is namespaced by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(uid: &str) -> Self {
        Self::new(uid)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque event identifier, unique within one user's collection.
///
/// Freshly created events get the creation time in epoch milliseconds,
/// but ids read back from the store are never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored value of a single event, exactly as it lives under
/// `users/{uid}/events/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[validate(length(min = 1, max = 500))]
    pub event_name: String,

    #[validate(length(min = 1, max = 32))]
    pub event_date: String,

    #[validate(length(min = 1, max = 32))]
    pub event_time: String,
}

/// Full contents of a user's event collection, keyed by event id.
pub type Snapshot = BTreeMap<String, EventRecord>;

/// Event as held in memory: the stored record plus the key it lives under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(flatten)]
    pub record: EventRecord,
}

impl Event {
    pub fn name(&self) -> &str {
        &self.record.event_name
    }

    pub fn date(&self) -> &str {
        &self.record.event_date
    }

    pub fn time(&self) -> &str {
        &self.record.event_time
    }

    /// Text shown inside a day cell, e.g. `Standup @ 14:00`.
    pub fn label(&self) -> String {
        format!("{} @ {}", self.record.event_name, self.record.event_time)
    }
}

/// Convert a keyed snapshot into an ordered list, attaching each key as the
/// event id. Order follows the snapshot's key iteration order.
pub fn events_from_snapshot(snapshot: Snapshot) -> Vec<Event> {
    snapshot
        .into_iter()
        .map(|(id, record)| Event {
            id: EventId::new(id),
            record,
        })
        .collect()
}

/// In-progress new-event form state. Field limits match [`EventRecord`] so
/// a draft that validates is accepted by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Draft {
    #[validate(length(min = 1, max = 32))]
    pub date: String,

    #[validate(length(min = 1, max = 32))]
    pub time: String,

    #[validate(length(min = 1, max = 500))]
    pub title: String,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.date.is_empty() && self.time.is_empty() && self.title.is_empty()
    }

    /// The record this draft would be stored as, once validated.
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            event_name: self.title.clone(),
            event_date: self.date.clone(),
            event_time: self.time.clone(),
        }
    }
}

/// Path inside the store's tree, e.g. `users/abc/events/1718459200000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath(String);

impl StorePath {
    /// Collection of all events owned by `uid`.
    pub fn events(uid: &UserId) -> Self {
        Self(format!("users/{}/events", uid))
    }

    /// Single event record owned by `uid`.
    pub fn event(uid: &UserId, id: &EventId) -> Self {
        Self(format!("users/{}/events/{}", uid, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a record path into its collection path and key.
    pub fn split_key(&self) -> Option<(StorePath, &str)> {
        let (parent, key) = self.0.rsplit_once('/')?;
        Some((StorePath(parent.to_string()), key))
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, date: &str, time: &str) -> EventRecord {
        EventRecord {
            event_name: name.to_string(),
            event_date: date.to_string(),
            event_time: time.to_string(),
        }
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let json = serde_json::to_value(record("Standup", "2024-06-15", "14:00")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "eventName": "Standup",
                "eventDate": "2024-06-15",
                "eventTime": "14:00",
            })
        );
    }

    #[test]
    fn snapshot_keys_become_event_ids() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "1718459200000": {"eventName": "B", "eventDate": "2024-06-15", "eventTime": "09:00"},
                "1718000000000": {"eventName": "A", "eventDate": "2024-06-10", "eventTime": "10:00"}
            }"#,
        )
        .unwrap();

        let events = events_from_snapshot(snapshot);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id.as_str(), "1718000000000");
        assert_eq!(events[0].name(), "A");
        assert_eq!(events[1].id.as_str(), "1718459200000");
    }

    #[test]
    fn event_label_joins_name_and_time() {
        let event = Event {
            id: EventId::from_millis(1),
            record: record("Standup", "2024-06-15", "14:00"),
        };
        assert_eq!(event.label(), "Standup @ 14:00");
    }

    #[test]
    fn draft_validation_reports_missing_fields() {
        let draft = Draft {
            date: "2024-06-15".to_string(),
            time: String::new(),
            title: String::new(),
        };
        let errors = draft.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("time"));
        assert!(fields.contains_key("title"));
        assert!(!fields.contains_key("date"));
    }

    #[test]
    fn store_paths_are_namespaced_by_user() {
        let uid = UserId::from("alice");
        let id = EventId::from_millis(42);
        assert_eq!(StorePath::events(&uid).as_str(), "users/alice/events");

        let path = StorePath::event(&uid, &id);
        assert_eq!(path.as_str(), "users/alice/events/42");

        let (parent, key) = path.split_key().unwrap();
        assert_eq!(parent, StorePath::events(&uid));
        assert_eq!(key, "42");
    }

    #[test]
    fn valid_draft_makes_a_valid_record() {
        let at_limits = Draft {
            date: "d".repeat(32),
            time: "t".repeat(32),
            title: "x".repeat(500),
        };
        assert!(at_limits.validate().is_ok());
        assert!(at_limits.to_record().validate().is_ok());

        let long_time = Draft {
            time: "t".repeat(33),
            ..at_limits
        };
        assert!(long_time.validate().is_err());
        assert!(long_time.to_record().validate().is_err());
    }
}
