// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-lifetime materialized entity sets.
//!
//! A cache is `Empty` until the first successful [`get_all`](EntitySet::get_all)
//! and `Populated` afterwards. Populated is terminal: removing every member
//! never causes a re-query. Only [`EntityCache::clear`] returns to `Empty`.
//!
//! The id index is a `DashMap`, safe for concurrent reads and inserts of
//! distinct ids. `add_or_update` and `remove` touch the index and the ordered
//! list one after the other, so concurrent writers of the same id need
//! external mutual exclusion.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use lambda_core::{EntityId, LambdaError};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::database::Database;
use crate::entity::{Entity, load_all};
use crate::notify::{EntityEvent, Subscribers};
use crate::params::Params;
use crate::set::EntitySet;

pub struct EntityCache<T: Entity> {
    db: Database,
    index: DashMap<EntityId, T>,
    items: RwLock<Vec<T>>,
    populated: AtomicBool,
    populating: Mutex<()>,
    subscribers: Subscribers<T>,
}

impl<T: Entity> EntityCache<T> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            index: DashMap::new(),
            items: RwLock::new(Vec::new()),
            populated: AtomicBool::new(false),
            populating: Mutex::new(()),
            subscribers: Subscribers::new(),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.populated.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Cached value for an id, without touching storage.
    pub fn get(&self, id: EntityId) -> Option<T> {
        self.index.get(&id).map(|entry| entry.value().clone())
    }

    /// Drop every member and return to `Empty`; the next read re-queries.
    pub async fn clear(&self) {
        let _guard = self.populating.lock().await;
        let mut items = self.items.write().await;
        items.clear();
        self.index.clear();
        self.populated.store(false, Ordering::Release);
        debug!(entity = %T::KIND, "cache cleared");
    }

    async fn populate(&self) -> Result<(), LambdaError> {
        let _guard = self.populating.lock().await;
        if self.is_populated() {
            return Ok(());
        }

        let rows = self.db.execute_query(T::SELECT_ALL, Params::new()).await?;
        let loaded: Vec<T> = load_all(&rows)?;

        let mut items = self.items.write().await;
        // Members added before the first read win over their stored rows.
        let pending: Vec<T> = items.drain(..).collect();
        let pending_ids: HashSet<EntityId> = pending.iter().map(|item| item.id()).collect();
        for item in loaded {
            if !pending_ids.contains(&item.id()) {
                self.index.insert(item.id(), item.clone());
                items.push(item);
            }
        }
        items.extend(pending);
        self.populated.store(true, Ordering::Release);

        info!(entity = %T::KIND, count = items.len(), "cache populated");
        Ok(())
    }
}

#[async_trait]
impl<T: Entity> EntitySet<T> for EntityCache<T> {
    /// Served from memory once populated.
    async fn get_all(&self) -> Result<Vec<T>, LambdaError> {
        if !self.is_populated() {
            self.populate().await?;
        }
        Ok(self.items.read().await.clone())
    }

    /// An existing id replaces the cached value and reports an update
    /// (`false`); a new id is appended and reported as new (`true`).
    async fn add_or_update(&self, item: T) -> bool {
        let id = item.id();
        let is_new = {
            let mut items = self.items.write().await;
            if self.index.contains_key(&id) {
                self.index.insert(id, item.clone());
                if let Some(slot) = items.iter_mut().find(|existing| existing.id() == id) {
                    *slot = item.clone();
                }
                false
            } else {
                self.index.insert(id, item.clone());
                items.push(item.clone());
                true
            }
        };
        debug!(entity = %T::KIND, %id, is_new, "cache add_or_update");
        self.subscribers.notify(&EntityEvent::Saved {
            entity: item,
            is_new,
        });
        is_new
    }

    /// Removes from index and list. The delete event fires whether or not the
    /// entity was a member.
    async fn remove(&self, item: &T) -> bool {
        let id = item.id();
        let removed = {
            let mut items = self.items.write().await;
            let in_index = self.index.remove(&id).is_some();
            let position = items.iter().position(|existing| existing.id() == id);
            let in_list = match position {
                Some(i) => {
                    items.remove(i);
                    true
                }
                None => false,
            };
            in_index && in_list
        };
        debug!(entity = %T::KIND, %id, removed, "cache remove");
        self.subscribers.notify(&EntityEvent::Deleted {
            entity: item.clone(),
        });
        removed
    }

    fn subscribers(&self) -> &Subscribers<T> {
        &self.subscribers
    }
}
