// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous in-process notifications for entity set writes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// What happened to an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent<T> {
    /// Added (`is_new`) or updated in a set.
    Saved { entity: T, is_new: bool },
    /// Removed from a set.
    Deleted { entity: T },
}

impl<T> EntityEvent<T> {
    pub fn entity(&self) -> &T {
        match self {
            EntityEvent::Saved { entity, .. } | EntityEvent::Deleted { entity } => entity,
        }
    }

    /// `true` only for a save that added a new member.
    pub fn is_new(&self) -> bool {
        matches!(self, EntityEvent::Saved { is_new: true, .. })
    }
}

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Arc<dyn Fn(&EntityEvent<T>) + Send + Sync>;

/// An observer list. Callbacks run on the caller's task, in subscription order.
pub struct Subscribers<T> {
    next: AtomicU64,
    callbacks: RwLock<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(0),
            callbacks: RwLock::new(Vec::new()),
        }
    }
}

impl<T> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.len())
            .finish()
    }
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&EntityEvent<T>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next.fetch_add(1, Ordering::Relaxed));
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(sid, _)| *sid != id);
        callbacks.len() != before
    }

    pub fn notify(&self, event: &EntityEvent<T>) {
        // Snapshot so callbacks may subscribe or unsubscribe.
        let callbacks: Vec<Callback<T>> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
