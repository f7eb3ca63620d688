// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The contract every persisted record type satisfies.

use async_trait::async_trait;
use lambda_core::{EntityId, EntityKind, LambdaError};
use tracing::{debug, error};

use crate::database::Database;
use crate::params::Params;
use crate::rowset::{Row, RowSet};

/// A record type with an integer surrogate key and canonical statements.
///
/// Statements use named `@Field` placeholders that match the names produced
/// by [`params`](Entity::params). Two values of an entity type are the same
/// entity iff their ids are equal; implementors compare by id.
pub trait Entity: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Registry key and error tag.
    const KIND: EntityKind;
    /// Returns every row of the table.
    const SELECT_ALL: &'static str;
    /// Updates every field of the row with `@ID`.
    const UPDATE: &'static str;
    /// Inserts a row without an id; the store assigns one.
    const INSERT: &'static str;
    /// Deletes the row with `@ID`.
    const DELETE: &'static str;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Build an entity from one retrieved row, failing with
    /// [`LambdaError::MalformedRow`] on a missing or mistyped column.
    fn from_row(row: &Row<'_>) -> Result<Self, LambdaError>;

    /// Named parameters for [`UPDATE`](Entity::UPDATE) (`include_id`) or
    /// [`INSERT`](Entity::INSERT).
    fn params(&self, include_id: bool) -> Params;

    fn is_saved(&self) -> bool {
        !self.id().is_unsaved()
    }
}

/// Map every row of a result, stopping at the first malformed one.
pub fn load_all<T: Entity>(rows: &RowSet) -> Result<Vec<T>, LambdaError> {
    rows.rows().map(|row| T::from_row(&row)).collect()
}

/// Write-through persistence for any [`Entity`].
#[async_trait]
pub trait Persist: Entity {
    /// Insert (unsaved) or update (saved) and return the resulting id.
    async fn try_save(&mut self, db: &Database) -> Result<EntityId, LambdaError>;

    /// Like [`try_save`](Persist::try_save), but failures are logged and
    /// reported as [`EntityId::UNSAVED`].
    async fn save(&mut self, db: &Database) -> EntityId;

    /// Delete by id; `true` iff exactly one row was removed.
    async fn try_delete(&self, db: &Database) -> Result<bool, LambdaError>;

    /// Like [`try_delete`](Persist::try_delete), with failures logged as `false`.
    async fn delete(&self, db: &Database) -> bool;
}

#[async_trait]
impl<T: Entity> Persist for T {
    async fn try_save(&mut self, db: &Database) -> Result<EntityId, LambdaError> {
        if self.id().is_unsaved() {
            let id = db.execute_insert(T::INSERT, self.params(false)).await?;
            self.set_id(id);
            debug!(entity = %T::KIND, %id, "entity inserted");
        } else {
            db.execute_non_query(T::UPDATE, self.params(true)).await?;
            debug!(entity = %T::KIND, id = %self.id(), "entity updated");
        }
        Ok(self.id())
    }

    async fn save(&mut self, db: &Database) -> EntityId {
        match self.try_save(db).await {
            Ok(id) => id,
            Err(e) => {
                error!(entity = %T::KIND, error = %e, "save failed");
                EntityId::UNSAVED
            }
        }
    }

    async fn try_delete(&self, db: &Database) -> Result<bool, LambdaError> {
        let affected = db
            .execute_non_query(T::DELETE, Params::new().with("@ID", self.id().get()))
            .await?;
        debug!(entity = %T::KIND, id = %self.id(), affected, "entity deleted");
        Ok(affected == 1)
    }

    async fn delete(&self, db: &Database) -> bool {
        match self.try_delete(db).await {
            Ok(deleted) => deleted,
            Err(e) => {
                error!(entity = %T::KIND, error = %e, "delete failed");
                false
            }
        }
    }
}
