//! Fan-out of collection snapshots to live subscribers.
//!
//! Each user with at least one open stream has a broadcast channel. After a
//! write the handler publishes the user's complete snapshot; streams forward
//! it as-is. Channels nobody listens to are dropped as soon as they are
//! looked up again.
//!
//! Writers of one user are serialized through [`SnapshotHub::write_lock`] so
//! that snapshots are published in the order the writes happened.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use shared::Snapshot;
use tokio::sync::{broadcast, Mutex as AsyncMutex, OwnedMutexGuard};

const CHANNEL_CAPACITY: usize = 16;

#[derive(Default)]
pub struct SnapshotHub {
    channels: Mutex<HashMap<String, broadcast::Sender<Snapshot>>>,
    writers: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive write access to `uid`'s collection. Hold it across the
    /// write, the snapshot read and the publish.
    pub async fn write_lock(&self, uid: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut writers = self.writers.lock().unwrap_or_else(|e| e.into_inner());
            // Only the map holds idle locks; holders and waiters own a clone.
            writers.retain(|_, lock| Arc::strong_count(lock) > 1);
            writers.entry(uid.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub fn subscribe(&self, uid: &str) -> broadcast::Receiver<Snapshot> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(uid.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Send `snapshot` to every open stream of `uid`. Returns how many
    /// streams received it.
    pub fn publish(&self, uid: &str, snapshot: Snapshot) -> usize {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = channels.get(uid) else {
            return 0;
        };

        match sender.send(snapshot) {
            Ok(receivers) => receivers,
            Err(_) => {
                channels.remove(uid);
                0
            }
        }
    }

    /// Open streams of `uid`. A channel whose streams have all closed is
    /// dropped here.
    pub fn subscriber_count(&self, uid: &str) -> usize {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        let count = channels.get(uid).map_or(0, |sender| sender.receiver_count());
        if count == 0 {
            channels.remove(uid);
        }
        count
    }

    #[cfg(test)]
    pub fn channel_count(&self) -> usize {
        self.channels.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[cfg(test)]
    pub fn writer_count(&self) -> usize {
        self.writers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::EventRecord;

    fn snapshot_with(id: &str) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            id.to_string(),
            EventRecord {
                event_name: "Standup".to_string(),
                event_date: "2024-06-15".to_string(),
                event_time: "14:00".to_string(),
            },
        );
        snapshot
    }

    #[tokio::test]
    async fn publish_reaches_only_that_users_streams() {
        let hub = SnapshotHub::new();
        let mut alice = hub.subscribe("alice");
        let mut bob = hub.subscribe("bob");

        assert_eq!(hub.publish("alice", snapshot_with("1")), 1);

        let received = alice.recv().await.unwrap();
        assert!(received.contains_key("1"));
        assert!(bob.try_recv().is_err());
    }

    #[test]
    fn channels_without_listeners_are_pruned() {
        let hub = SnapshotHub::new();
        assert_eq!(hub.publish("alice", Snapshot::new()), 0);

        let receiver = hub.subscribe("alice");
        assert_eq!(hub.subscriber_count("alice"), 1);
        drop(receiver);

        assert_eq!(hub.publish("alice", Snapshot::new()), 0);
        assert_eq!(hub.subscriber_count("alice"), 0);
    }

    #[test]
    fn counting_closed_channel_drops_it() {
        let hub = SnapshotHub::new();
        drop(hub.subscribe("alice"));
        assert_eq!(hub.channel_count(), 1);

        assert_eq!(hub.subscriber_count("alice"), 0);
        assert_eq!(hub.channel_count(), 0);
    }

    #[tokio::test]
    async fn write_lock_serializes_one_user_only() {
        let hub = Arc::new(SnapshotHub::new());
        let alice = hub.write_lock("alice").await;

        let _bob = hub.write_lock("bob").await;

        let waiter = {
            let hub = hub.clone();
            tokio::spawn(async move {
                let _guard = hub.write_lock("alice").await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(alice);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn idle_write_locks_are_released() {
        let hub = SnapshotHub::new();
        drop(hub.write_lock("alice").await);
        drop(hub.write_lock("bob").await);

        // Taking a lock sweeps the idle ones; only "bob" was just re-added.
        assert_eq!(hub.writer_count(), 1);
    }
}
