//! Storage of per-user event collections.
//!
//! The store is a tree: `users/{uid}/events/{id}` holds one record, and a
//! read of `users/{uid}/events` returns every record of that user keyed by id.
//! [`EventRepository`] is that tree's contract; PostgreSQL and in-memory
//! implementations back it.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::{EventRecord, Snapshot};
use tokio::sync::RwLock;

use crate::error::ApiResult;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Every record of `uid`, keyed by event id. Unknown users are empty.
    async fn snapshot(&self, uid: &str) -> ApiResult<Snapshot>;

    /// Create or overwrite one record.
    async fn put(&self, uid: &str, event_id: &str, record: &EventRecord) -> ApiResult<()>;

    /// Remove one record. Returns whether anything was removed.
    async fn remove(&self, uid: &str, event_id: &str) -> ApiResult<bool>;
}

/// Process-local repository. Used when no database is configured and in
/// tests.
#[derive(Default)]
pub struct MemoryEventRepository {
    users: RwLock<HashMap<String, Snapshot>>,
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn snapshot(&self, uid: &str) -> ApiResult<Snapshot> {
        Ok(self.users.read().await.get(uid).cloned().unwrap_or_default())
    }

    async fn put(&self, uid: &str, event_id: &str, record: &EventRecord) -> ApiResult<()> {
        self.users
            .write()
            .await
            .entry(uid.to_string())
            .or_default()
            .insert(event_id.to_string(), record.clone());
        Ok(())
    }

    async fn remove(&self, uid: &str, event_id: &str) -> ApiResult<bool> {
        let mut users = self.users.write().await;
        let removed = users
            .get_mut(uid)
            .map(|events| events.remove(event_id).is_some())
            .unwrap_or(false);
        if users.get(uid).is_some_and(|events| events.is_empty()) {
            users.remove(uid);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> EventRecord {
        EventRecord {
            event_name: name.to_string(),
            event_date: "2024-06-15".to_string(),
            event_time: "14:00".to_string(),
        }
    }

    #[tokio::test]
    async fn put_overwrites_and_remove_reports() {
        let repo = MemoryEventRepository::new();
        repo.put("alice", "1", &record("Draft")).await.unwrap();
        repo.put("alice", "1", &record("Final")).await.unwrap();

        let snapshot = repo.snapshot("alice").await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["1"].event_name, "Final");

        assert!(repo.remove("alice", "1").await.unwrap());
        assert!(!repo.remove("alice", "1").await.unwrap());
        assert!(repo.snapshot("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn users_do_not_see_each_other() {
        let repo = MemoryEventRepository::new();
        repo.put("alice", "1", &record("Alice")).await.unwrap();

        assert!(repo.snapshot("bob").await.unwrap().is_empty());
        assert!(!repo.remove("bob", "1").await.unwrap());
        assert_eq!(repo.snapshot("alice").await.unwrap().len(), 1);
    }
}
