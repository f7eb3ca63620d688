// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lambda data-access layer.
//!
//! This crate provides the error taxonomy and the small set of shared types
//! (entity ids, entity kinds, isolation levels) used by the storage,
//! configuration and demonstration crates.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LambdaError;
pub use types::{EntityId, EntityKind, IsolationLevel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_error_has_all_variants() {
        let _config = LambdaError::Config("test".into());
        let _storage = LambdaError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _statement = LambdaError::Statement {
            statement: "SELECT 1".into(),
            source: Box::new(std::io::Error::other("test")),
        };
        let _malformed = LambdaError::MalformedRow {
            entity: EntityKind::User,
            column: "Credit".into(),
            reason: "missing".into(),
        };
        let _aborted = LambdaError::TransactionAborted {
            index: 2,
            source: Box::new(LambdaError::Internal("boom".into())),
        };
        let _not_found = LambdaError::NotFound {
            entity: EntityKind::User,
            detail: "username = admin".into(),
        };
        let _conflict = LambdaError::Conflict {
            entity: EntityKind::LunchOrder,
            detail: "already ordered".into(),
        };
        let _invalid = LambdaError::InvalidInput("month 13".into());
        let _internal = LambdaError::Internal("test".into());
    }

    #[test]
    fn transaction_aborted_reports_failing_statement() {
        let err = LambdaError::TransactionAborted {
            index: 2,
            source: Box::new(LambdaError::Internal("no such table".into())),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("statement 2"), "got: {rendered}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn entity_kind_round_trips_through_strings() {
        use std::str::FromStr;

        for kind in EntityKind::ALL {
            let parsed = EntityKind::from_str(&kind.to_string()).expect("should parse back");
            assert_eq!(kind, parsed);
        }
    }
}
