// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Lambda workspace.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Surrogate key of a persisted entity.
///
/// [`EntityId::UNSAVED`] marks an entity that has never been written to the
/// store. Once the store assigns a real id it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    /// Sentinel for "not yet persisted".
    pub const UNSAVED: EntityId = EntityId(-1);

    /// Returns true if this is the sentinel id.
    pub fn is_unsaved(self) -> bool {
        self == Self::UNSAVED
    }

    /// The raw integer key.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::UNSAVED
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of entity kinds persisted by this layer.
///
/// Used as the registry key for retrievers and caches, and as the entity tag
/// in errors and log fields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum EntityKind {
    User,
    MealType,
    Meal,
    Lunch,
    LunchOrder,
}

impl EntityKind {
    /// Every kind, in dependency order (referenced tables first).
    pub const ALL: [EntityKind; 5] = [
        EntityKind::User,
        EntityKind::MealType,
        EntityKind::Meal,
        EntityKind::Lunch,
        EntityKind::LunchOrder,
    ];
}

/// Consistency contract a transaction requests from the store.
///
/// Parsed from configuration in snake case (`read_committed`) or in the
/// upper snake case (`READ_COMMITTED`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IsolationLevel {
    #[serde(alias = "READ_UNCOMMITTED")]
    #[strum(serialize = "read_uncommitted", serialize = "read-uncommitted")]
    ReadUncommitted,
    #[serde(alias = "READ_COMMITTED")]
    #[strum(serialize = "read_committed", serialize = "read-committed")]
    ReadCommitted,
    #[default]
    #[serde(alias = "REPEATABLE_READ")]
    #[strum(serialize = "repeatable_read", serialize = "repeatable-read")]
    RepeatableRead,
    #[serde(alias = "SERIALIZABLE")]
    Serializable,
}

impl IsolationLevel {
    /// Every level, weakest first.
    pub const ALL: [IsolationLevel; 4] = [
        IsolationLevel::ReadUncommitted,
        IsolationLevel::ReadCommitted,
        IsolationLevel::RepeatableRead,
        IsolationLevel::Serializable,
    ];

    /// SQL spelling, as in `SET TRANSACTION ISOLATION LEVEL <level>`.
    pub fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }

    /// Whether a second read of the same row inside one transaction is
    /// guaranteed to return the first read's value.
    pub fn guarantees_repeatable_reads(self) -> bool {
        matches!(
            self,
            IsolationLevel::RepeatableRead | IsolationLevel::Serializable
        )
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
