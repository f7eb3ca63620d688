// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owned tabular query results.
//!
//! A [`RowSet`] is materialized on the connection thread and handed back to
//! async code; [`Row`] is a borrowed view used by entity row mappers.

use lambda_core::{EntityKind, LambdaError};
use rusqlite::types::{FromSql, Value, ValueRef};

/// A column lookup or conversion failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column `{column}`: {reason}")]
pub struct ColumnError {
    pub column: String,
    pub reason: String,
}

impl ColumnError {
    /// Attribute the failure to an entity kind.
    pub fn for_entity(self, entity: EntityKind) -> LambdaError {
        LambdaError::MalformedRow {
            entity,
            column: self.column,
            reason: self.reason,
        }
    }
}

/// Column names plus every row's values, in result order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Run a prepared statement and collect everything it returns.
    pub(crate) fn collect(
        stmt: &mut rusqlite::Statement<'_>,
        params: &[(&str, &dyn rusqlite::ToSql)],
    ) -> rusqlite::Result<Self> {
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut rows = Vec::new();
        let mut cursor = stmt.query(params)?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(row.get::<_, Value>(i)?);
            }
            rows.push(values);
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn first(&self) -> Option<Row<'_>> {
        self.rows().next()
    }
}

/// One row of a [`RowSet`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Raw value of a column, matched case-insensitively.
    pub fn value(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|i| self.values.get(i))
    }

    /// Typed value of a column.
    pub fn get<T: FromSql>(&self, column: &str) -> Result<T, ColumnError> {
        let value = self.value(column).ok_or_else(|| ColumnError {
            column: column.to_string(),
            reason: "missing from result".to_string(),
        })?;
        T::column_result(ValueRef::from(value)).map_err(|e| ColumnError {
            column: column.to_string(),
            reason: e.to_string(),
        })
    }

    /// Typed value of a column, failing as a malformed row of `entity`.
    pub fn field<T: FromSql>(&self, entity: EntityKind, column: &str) -> Result<T, LambdaError> {
        self.get(column).map_err(|e| e.for_entity(entity))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
