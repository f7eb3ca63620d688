// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owned named parameters for `@Field` placeholders.
//!
//! Statements run on the connection's background thread, so parameters are
//! owned values that can be moved into the `call` closure.

use rusqlite::ToSql;
use rusqlite::types::Value;

/// An ordered list of `(@Name, value)` bindings.
///
/// Names are normalized to carry the leading `@`, so `with("ID", 1)` and
/// `with("@ID", 1)` bind the same placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Value)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style bind.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Bind a value, replacing any existing binding of the same name.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) {
        let name = normalize(name);
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Look up a binding by name (with or without the `@`).
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = normalize(name);
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    /// Borrowed view in the shape rusqlite binds by name.
    pub(crate) fn as_named(&self) -> Vec<(&str, &dyn ToSql)> {
        self.0
            .iter()
            .map(|(n, v)| (n.as_str(), v as &dyn ToSql))
            .collect()
    }
}

fn normalize(name: &str) -> String {
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{name}")
    }
}
