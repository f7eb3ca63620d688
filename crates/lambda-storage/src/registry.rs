// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One retriever and one cache per entity kind, created on first access.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use lambda_core::{EntityKind, LambdaError};

use crate::cache::EntityCache;
use crate::database::Database;
use crate::entity::Entity;
use crate::retriever::EntityRetriever;

type Erased = Arc<dyn Any + Send + Sync>;

/// Kind-keyed instances shared by everything holding the registry.
///
/// Owned by the composition root; hand out clones of the `Arc` it lives in.
pub struct Registry {
    db: Database,
    retrievers: DashMap<EntityKind, Erased>,
    caches: DashMap<EntityKind, Erased>,
}

impl Registry {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            retrievers: DashMap::new(),
            caches: DashMap::new(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn retriever<T: Entity>(&self) -> Result<Arc<EntityRetriever<T>>, LambdaError> {
        let erased = self
            .retrievers
            .entry(T::KIND)
            .or_insert_with(|| Arc::new(EntityRetriever::<T>::new(self.db.clone())) as Erased)
            .clone();
        erased
            .downcast::<EntityRetriever<T>>()
            .map_err(|_| kind_conflict(T::KIND))
    }

    pub fn cache<T: Entity>(&self) -> Result<Arc<EntityCache<T>>, LambdaError> {
        let erased = self
            .caches
            .entry(T::KIND)
            .or_insert_with(|| Arc::new(EntityCache::<T>::new(self.db.clone())) as Erased)
            .clone();
        erased
            .downcast::<EntityCache<T>>()
            .map_err(|_| kind_conflict(T::KIND))
    }
}

fn kind_conflict(kind: EntityKind) -> LambdaError {
    LambdaError::Internal(format!(
        "entity kind {kind} is registered to a different type"
    ))
}
