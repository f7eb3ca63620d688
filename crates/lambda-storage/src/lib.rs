// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite data-access layer for the Lambda lunch ordering store.
//!
//! Provides a WAL-mode statement executor with embedded schema bootstrap,
//! transactions with caller-chosen isolation levels, and two per-type entity
//! sets: the always-fresh [`EntityRetriever`] and the process-lifetime
//! [`EntityCache`], both reachable through the kind-keyed [`Registry`].

pub mod cache;
pub mod database;
pub mod entity;
pub mod migrations;
pub mod models;
pub mod notify;
pub mod ordering;
pub mod params;
pub mod registry;
pub mod retriever;
pub mod rowset;
pub mod set;
pub mod transaction;

pub use cache::EntityCache;
pub use database::{ConnectionOptions, Database, StatsSnapshot, is_busy};
pub use entity::{Entity, Persist};
pub use models::*;
pub use notify::{EntityEvent, SubscriptionId};
pub use params::Params;
pub use registry::Registry;
pub use retriever::EntityRetriever;
pub use rowset::{Row, RowSet};
pub use set::EntitySet;
pub use transaction::{Transaction, TransactionUnit};
