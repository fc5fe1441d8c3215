//! Change notifications published by the record store.
//!
//! Subscribers receive one [`ChangeEvent`] per committed mutation and are
//! expected to re-fetch the affected snapshot. Events carry no row data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Which collection changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
pub enum ChangeKind {
    Patients,
    Specialties,
    Medications,
    MedicationFamilies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
pub enum ChangeAction {
    Inserted,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub action: ChangeAction,
    /// ID of the changed row, when a single row changed
    pub record_id: Option<String>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, action: ChangeAction, record_id: impl Into<String>) -> Self {
        Self {
            kind,
            action,
            record_id: Some(record_id.into()),
        }
    }
}

/// Identifies one subscriber, for [`ChangeFeed::unsubscribe`].
pub type SubscriberId = u64;

/// Fan-out of change events to channel subscribers.
#[derive(Debug, Default)]
pub struct ChangeFeed {
    subscribers: Mutex<Vec<(SubscriberId, Sender<ChangeEvent>)>>,
    next_id: AtomicU64,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.register().1
    }

    /// Register a new subscriber that can later be removed with [`Self::unsubscribe`].
    pub fn register(&self) -> (SubscriberId, Receiver<ChangeEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();
        self.lock().push((id, tx));
        (id, rx)
    }

    /// Drop a subscriber's sender. Its receiver drains what was already
    /// queued and then disconnects. Returns `false` for an unknown id.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|(subscriber, _)| *subscriber != id);
        let removed = subscribers.len() < before;
        if removed {
            tracing::debug!(subscriber = id, remaining = subscribers.len(), "unsubscribed");
        }
        removed
    }

    /// Deliver `event` to every live subscriber, dropping disconnected ones.
    pub fn publish(&self, event: ChangeEvent) {
        let mut subscribers = self.lock();
        subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
        tracing::trace!(
            kind = ?event.kind,
            action = ?event.action,
            subscribers = subscribers.len(),
            "published change"
        );
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriberId, Sender<ChangeEvent>)>> {
        // A panic while holding the lock cannot leave the list inconsistent.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
