// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Always-fresh entity reads.

use async_trait::async_trait;
use lambda_core::LambdaError;
use tracing::debug;

use crate::database::Database;
use crate::entity::{Entity, load_all};
use crate::notify::{EntityEvent, Subscribers};
use crate::params::Params;
use crate::set::EntitySet;

/// Re-queries storage on every call and keeps no rows between calls.
pub struct EntityRetriever<T: Entity> {
    db: Database,
    subscribers: Subscribers<T>,
}

impl<T: Entity> EntityRetriever<T> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            subscribers: Subscribers::new(),
        }
    }
}

#[async_trait]
impl<T: Entity> EntitySet<T> for EntityRetriever<T> {
    async fn get_all(&self) -> Result<Vec<T>, LambdaError> {
        let rows = self.db.execute_query(T::SELECT_ALL, Params::new()).await?;
        let items = load_all(&rows)?;
        debug!(entity = %T::KIND, count = items.len(), "retrieved entities");
        Ok(items)
    }

    /// Broadcasts the save. A retriever cannot tell new from updated, so it
    /// always reports an update and returns `false`.
    async fn add_or_update(&self, item: T) -> bool {
        self.subscribers.notify(&EntityEvent::Saved {
            entity: item,
            is_new: false,
        });
        false
    }

    /// Broadcasts the delete. There is nothing held to remove, so this
    /// returns `true` once subscribers have been told.
    async fn remove(&self, item: &T) -> bool {
        self.subscribers.notify(&EntityEvent::Deleted {
            entity: item.clone(),
        });
        true
    }

    fn subscribers(&self) -> &Subscribers<T> {
        &self.subscribers
    }
}
