// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lambda data-access layer.

use thiserror::Error;

use crate::types::EntityKind;

/// The primary error type returned by the executor, entity sets and drivers.
///
/// Low-level driver failures are never masked as zero or empty results; they
/// surface here so callers can tell "nothing happened" apart from "failed".
#[derive(Debug, Error)]
pub enum LambdaError {
    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection lifecycle errors (open, pragma setup, schema bootstrap, close).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A single statement failed inside the store.
    #[error("statement failed ({statement}): {source}")]
    Statement {
        statement: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A retrieved row could not be mapped to an entity.
    #[error("malformed {entity} row: column `{column}`: {reason}")]
    MalformedRow {
        entity: EntityKind,
        column: String,
        reason: String,
    },

    /// A statement inside a transaction unit failed; the unit was rolled back.
    #[error("transaction aborted at statement {index}: {source}")]
    TransactionAborted {
        index: usize,
        source: Box<LambdaError>,
    },

    /// A row the caller required does not exist.
    #[error("{entity} not found: {detail}")]
    NotFound { entity: EntityKind, detail: String },

    /// The write would break a business rule on existing rows.
    #[error("{entity} conflict: {detail}")]
    Conflict { entity: EntityKind, detail: String },

    /// A caller-supplied argument is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
