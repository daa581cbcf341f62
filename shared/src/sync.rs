//! Sync layer between the calendar view and the remote event store.
//!
//! Every operation is namespaced by the current user's id. Operations that
//! cannot run (no signed-in user, incomplete draft) return an error instead of
//! touching the store; the view treats those errors as silent no-ops.

use std::cell::Cell;

use chrono::Utc;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::models::{events_from_snapshot, Draft, Event, EventId, StorePath, UserId};
use crate::store::{EventStore, IdentityProvider, StoreError, Subscription};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("No signed-in user")]
    MissingIdentity,

    #[error("Draft is incomplete or too long: {0}")]
    IncompleteDraft(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The write or delete went through; only re-reading the collection
    /// afterwards failed.
    #[error("Change stored, but refreshing events failed: {0}")]
    Refresh(StoreError),
}

impl SyncError {
    /// Whether the store accepted the change despite this error.
    pub fn change_stored(&self) -> bool {
        matches!(self, Self::Refresh(_))
    }
}

/// Hands out millisecond-timestamp ids that never repeat within one
/// generator, even for two creates in the same millisecond.
pub struct IdGenerator {
    clock: Box<dyn Fn() -> i64>,
    last: Cell<i64>,
}

impl IdGenerator {
    pub fn new(clock: impl Fn() -> i64 + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            last: Cell::new(i64::MIN),
        }
    }

    pub fn system() -> Self {
        Self::new(|| Utc::now().timestamp_millis())
    }

    pub fn next_id(&self) -> EventId {
        let now = (self.clock)();
        let id = if now > self.last.get() {
            now
        } else {
            self.last.get() + 1
        };
        self.last.set(id);
        EventId::from_millis(id)
    }
}

pub struct EventSync<S, I> {
    store: S,
    identity: I,
    ids: IdGenerator,
}

impl<S: EventStore, I: IdentityProvider> EventSync<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self::with_ids(store, identity, IdGenerator::system())
    }

    pub fn with_ids(store: S, identity: I, ids: IdGenerator) -> Self {
        Self {
            store,
            identity,
            ids,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn user(&self) -> Result<UserId, SyncError> {
        self.identity.current_user().ok_or(SyncError::MissingIdentity)
    }

    /// Subscribe to the user's whole collection. `on_events` receives the
    /// complete, freshly converted list on every change.
    pub fn subscribe(
        &self,
        on_events: impl Fn(Vec<Event>) + 'static,
    ) -> Result<Subscription, SyncError> {
        let uid = self.user()?;
        let collection = StorePath::events(&uid);
        tracing::debug!(%collection, "Subscribing to events");

        let subscription = self.store.subscribe(
            &collection,
            Box::new(move |snapshot| on_events(events_from_snapshot(snapshot))),
        )?;
        Ok(subscription)
    }

    /// Read the user's whole collection once.
    pub async fn fetch(&self) -> Result<Vec<Event>, SyncError> {
        let uid = self.user()?;
        let snapshot = self.store.read(&StorePath::events(&uid)).await?;
        Ok(events_from_snapshot(snapshot))
    }

    /// Store `draft` as a new event under a fresh id, then re-read the
    /// collection and return it.
    pub async fn create(&self, draft: &Draft) -> Result<Vec<Event>, SyncError> {
        let uid = self.user()?;
        draft.validate()?;

        let id = self.ids.next_id();
        let path = StorePath::event(&uid, &id);
        self.store.write(&path, &draft.to_record()).await?;
        tracing::info!(%path, "Created event");

        self.refresh(&uid).await
    }

    /// Delete the event `id`, then re-read the collection and return it.
    pub async fn remove(&self, id: &EventId) -> Result<Vec<Event>, SyncError> {
        let uid = self.user()?;
        let path = StorePath::event(&uid, id);
        self.store.delete(&path).await?;
        tracing::info!(%path, "Removed event");

        self.refresh(&uid).await
    }

    async fn refresh(&self, uid: &UserId) -> Result<Vec<Event>, SyncError> {
        let snapshot = self
            .store
            .read(&StorePath::events(uid))
            .await
            .map_err(SyncError::Refresh)?;
        Ok(events_from_snapshot(snapshot))
    }
}
