// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The read surface shared by retrievers and caches.

use async_trait::async_trait;
use lambda_core::LambdaError;

use crate::entity::Entity;
use crate::notify::{EntityEvent, SubscriptionId, Subscribers};

/// Filter passed to [`EntitySet::get_all_by`] and [`EntitySet::get_first_by`].
pub type Predicate<'a, T> = &'a (dyn Fn(&T) -> bool + Send + Sync);

/// A per-type view over stored entities.
///
/// `add_or_update` and `remove` never write to storage; persist with
/// [`Persist`](crate::entity::Persist) first, then tell the set.
#[async_trait]
pub trait EntitySet<T: Entity>: Send + Sync {
    async fn get_all(&self) -> Result<Vec<T>, LambdaError>;

    async fn get_all_by(&self, predicate: Predicate<'_, T>) -> Result<Vec<T>, LambdaError> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|item| predicate(item))
            .collect())
    }

    async fn get_first_by(&self, predicate: Predicate<'_, T>) -> Result<Option<T>, LambdaError> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .find(|item| predicate(item)))
    }

    /// Record a saved entity. Returns `true` if it became a new member.
    async fn add_or_update(&self, item: T) -> bool;

    /// Record a deleted entity. Returns whether anything was removed.
    async fn remove(&self, item: &T) -> bool;

    fn subscribers(&self) -> &Subscribers<T>;

    fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&EntityEvent<T>) + Send + Sync + 'static,
        Self: Sized,
    {
        self.subscribers().subscribe(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers().unsubscribe(id)
    }
}
