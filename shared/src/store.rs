//! Capabilities the calendar needs from the outside world: who the current
//! user is, and a tree-shaped store with live subscriptions.
//!
//! Both are injected into [`crate::sync::EventSync`] so the browser can plug
//! in its HTTP adapters and tests can plug in [`crate::memory::MemoryStore`].

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{EventRecord, Snapshot, StorePath, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Request never produced a response.
    #[error("Store unreachable: {0}")]
    Transport(String),

    /// Store answered with a non-success status.
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Invalid store response: {0}")]
    Decode(String),

    #[error("Subscription failed: {0}")]
    Subscribe(String),
}

/// Called with the complete collection every time it changes.
pub type SnapshotListener = Box<dyn Fn(Snapshot)>;

/// Standing subscription to a collection. The listener is released when
/// this is dropped or [`Subscription::unsubscribe`] is called.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Tree-structured keyed storage with live subscriptions.
///
/// Futures are not `Send`: implementations run on the browser's single
/// thread.
#[async_trait(?Send)]
pub trait EventStore {
    /// Current contents of a collection. A missing collection is empty.
    async fn read(&self, collection: &StorePath) -> Result<Snapshot, StoreError>;

    /// Create or overwrite the record at `path`.
    async fn write(&self, path: &StorePath, record: &EventRecord) -> Result<(), StoreError>;

    /// Remove the record at `path`. Removing a missing record succeeds.
    async fn delete(&self, path: &StorePath) -> Result<(), StoreError>;

    /// Register `listener` for every change of `collection`, starting with
    /// its current contents.
    fn subscribe(
        &self,
        collection: &StorePath,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError>;
}

/// Source of the signed-in user, if any.
pub trait IdentityProvider {
    fn current_user(&self) -> Option<UserId>;
}

impl IdentityProvider for Option<UserId> {
    fn current_user(&self) -> Option<UserId> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn subscription_cancels_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let subscription = Subscription::new(move || counter.set(counter.get() + 1));

        subscription.unsubscribe();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn dropping_subscription_cancels() {
        let calls = Rc::new(Cell::new(0));
        {
            let counter = calls.clone();
            let _subscription = Subscription::new(move || counter.set(counter.get() + 1));
        }
        assert_eq!(calls.get(), 1);
    }
}
