//! In-process [`EventStore`] with the same snapshot-push semantics as the
//! backend: every listener receives the full collection on subscribe and
//! after every write or delete.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use async_trait::async_trait;

use crate::models::{EventRecord, Snapshot, StorePath};
use crate::store::{EventStore, SnapshotListener, StoreError, Subscription};

type SharedListener = Rc<dyn Fn(Snapshot)>;

#[derive(Default)]
struct Inner {
    collections: HashMap<StorePath, Snapshot>,
    listeners: HashMap<StorePath, Vec<(u64, SharedListener)>>,
    next_listener: u64,
    offline: bool,
}

/// Cheap to clone; clones share the same tree.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with [`StoreError::Transport`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    pub fn listener_count(&self, collection: &StorePath) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub fn snapshot(&self, collection: &StorePath) -> Snapshot {
        self.inner
            .borrow()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.inner.borrow().offline {
            return Err(StoreError::Transport("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn record_location(path: &StorePath) -> Result<(StorePath, String), StoreError> {
        path.split_key()
            .map(|(collection, key)| (collection, key.to_string()))
            .ok_or_else(|| StoreError::Rejected {
                status: 400,
                message: format!("{path} is not a record path"),
            })
    }

    /// Push the collection's current contents to all of its listeners.
    /// Listeners run without the store borrowed so they may call back in.
    fn notify(&self, collection: &StorePath) {
        let (snapshot, listeners) = {
            let inner = self.inner.borrow();
            let listeners: Vec<SharedListener> = inner
                .listeners
                .get(collection)
                .map(|entries| entries.iter().map(|(_, listener)| listener.clone()).collect())
                .unwrap_or_default();
            let snapshot = inner
                .collections
                .get(collection)
                .cloned()
                .unwrap_or_default();
            (snapshot, listeners)
        };

        for listener in listeners {
            listener(snapshot.clone());
        }
    }
}

#[async_trait(?Send)]
impl EventStore for MemoryStore {
    async fn read(&self, collection: &StorePath) -> Result<Snapshot, StoreError> {
        self.ensure_online()?;
        Ok(self.snapshot(collection))
    }

    async fn write(&self, path: &StorePath, record: &EventRecord) -> Result<(), StoreError> {
        self.ensure_online()?;
        let (collection, key) = Self::record_location(path)?;
        self.inner
            .borrow_mut()
            .collections
            .entry(collection.clone())
            .or_default()
            .insert(key, record.clone());
        self.notify(&collection);
        Ok(())
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        self.ensure_online()?;
        let (collection, key) = Self::record_location(path)?;
        let removed = self
            .inner
            .borrow_mut()
            .collections
            .get_mut(&collection)
            .and_then(|snapshot| snapshot.remove(&key))
            .is_some();
        if removed {
            self.notify(&collection);
        }
        Ok(())
    }

    fn subscribe(
        &self,
        collection: &StorePath,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError> {
        self.ensure_online()?;
        let listener: SharedListener = Rc::from(listener);
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner
                .listeners
                .entry(collection.clone())
                .or_default()
                .push((id, listener.clone()));
            id
        };

        listener(self.snapshot(collection));

        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        let collection = collection.clone();
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                if let Some(entries) = inner.listeners.get_mut(&collection) {
                    entries.retain(|(entry, _)| *entry != id);
                    if entries.is_empty() {
                        inner.listeners.remove(&collection);
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventId, UserId};
    use futures::executor::block_on;

    fn record(name: &str) -> EventRecord {
        EventRecord {
            event_name: name.to_string(),
            event_date: "2024-06-15".to_string(),
            event_time: "14:00".to_string(),
        }
    }

    fn recording_listener() -> (Rc<RefCell<Vec<Snapshot>>>, SnapshotListener) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, Box::new(move |snapshot| sink.borrow_mut().push(snapshot)))
    }

    #[test]
    fn subscribe_emits_current_contents_then_every_change() {
        let store = MemoryStore::new();
        let uid = UserId::from("alice");
        let events = StorePath::events(&uid);
        let id = EventId::from_millis(1);

        let (seen, listener) = recording_listener();
        let _subscription = store.subscribe(&events, listener).unwrap();

        block_on(store.write(&StorePath::event(&uid, &id), &record("Standup"))).unwrap();
        block_on(store.delete(&StorePath::event(&uid, &id))).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].is_empty());
        assert_eq!(seen[1].get("1"), Some(&record("Standup")));
        assert!(seen[2].is_empty());
    }

    #[test]
    fn collections_are_isolated_per_user() {
        let store = MemoryStore::new();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");

        let (seen, listener) = recording_listener();
        let _subscription = store.subscribe(&StorePath::events(&bob), listener).unwrap();

        block_on(store.write(
            &StorePath::event(&alice, &EventId::from_millis(1)),
            &record("Alice only"),
        ))
        .unwrap();

        assert_eq!(seen.borrow().len(), 1);
        assert!(store.snapshot(&StorePath::events(&bob)).is_empty());
        assert_eq!(store.snapshot(&StorePath::events(&alice)).len(), 1);
    }

    #[test]
    fn unsubscribe_releases_listener() {
        let store = MemoryStore::new();
        let events = StorePath::events(&UserId::from("alice"));

        let (seen, listener) = recording_listener();
        let subscription = store.subscribe(&events, listener).unwrap();
        assert_eq!(store.listener_count(&events), 1);

        subscription.unsubscribe();
        assert_eq!(store.listener_count(&events), 0);

        block_on(store.write(
            &StorePath::event(&UserId::from("alice"), &EventId::from_millis(1)),
            &record("Late"),
        ))
        .unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn deleting_missing_record_is_quiet() {
        let store = MemoryStore::new();
        let uid = UserId::from("alice");
        let (seen, listener) = recording_listener();
        let _subscription = store.subscribe(&StorePath::events(&uid), listener).unwrap();

        block_on(store.delete(&StorePath::event(&uid, &EventId::from("missing")))).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn offline_store_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let uid = UserId::from("alice");

        let err = block_on(store.read(&StorePath::events(&uid))).unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
        assert!(store
            .subscribe(&StorePath::events(&uid), Box::new(|_| {}))
            .is_err());
    }
}
