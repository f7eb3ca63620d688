// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transactions with caller-chosen isolation.
//!
//! SQLite has no `SET TRANSACTION ISOLATION LEVEL`, so each level maps onto a
//! begin mode and a snapshot rule:
//!
//! | level | begin | reads |
//! |---|---|---|
//! | `ReadUncommitted` | deferred, issued before the first write; `read_uncommitted` pragma on (no effect, see below) | same as `ReadCommitted` |
//! | `ReadCommitted` | deferred, issued before the first write | latest committed data until the first write |
//! | `RepeatableRead` | `BEGIN DEFERRED` up front | snapshot fixed at the first read |
//! | `Serializable` | `BEGIN IMMEDIATE` up front | write lock held until commit; competing writers time out busy |
//!
//! The `read_uncommitted` pragma only takes effect between connections of one
//! shared cache. Connections here never share a cache, so `ReadUncommitted`
//! never sees another connection's uncommitted writes and behaves exactly like
//! `ReadCommitted`.
//!
//! The level applies only to the transaction it was requested for, since each
//! transaction runs on its own connection.

use std::sync::Arc;

use lambda_core::{EntityId, IsolationLevel, LambdaError};
use rusqlite::types::FromSql;
use tracing::{debug, warn};

use crate::database::{ExecutorStats, map_tr_err, scalar_from, statement_err};
use crate::params::Params;
use crate::rowset::RowSet;

/// An ordered batch of statements plus the isolation level to run it under.
#[derive(Debug, Clone, Default)]
pub struct TransactionUnit {
    isolation: IsolationLevel,
    statements: Vec<(String, Params)>,
}

impl TransactionUnit {
    pub fn new(isolation: IsolationLevel) -> Self {
        Self {
            isolation,
            statements: Vec::new(),
        }
    }

    /// Append a statement (builder style).
    pub fn statement(mut self, statement: impl Into<String>, params: Params) -> Self {
        self.push(statement, params);
        self
    }

    pub fn push(&mut self, statement: impl Into<String>, params: Params) {
        self.statements.push((statement.into(), params));
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    pub fn statements(&self) -> &[(String, Params)] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn into_statements(self) -> Vec<(String, Params)> {
        self.statements
    }
}

/// Statement issued when the transaction starts, if the level begins eagerly.
fn eager_begin(isolation: IsolationLevel) -> Option<&'static str> {
    match isolation {
        IsolationLevel::ReadUncommitted | IsolationLevel::ReadCommitted => None,
        IsolationLevel::RepeatableRead => Some("BEGIN DEFERRED"),
        IsolationLevel::Serializable => Some("BEGIN IMMEDIATE"),
    }
}

type StatementOp<R> = fn(&mut rusqlite::Statement<'_>, &Params) -> rusqlite::Result<R>;

/// A caller-managed transaction on a dedicated connection.
///
/// Obtained from [`Database::begin`](crate::Database::begin). Finish it with
/// [`commit`](Self::commit) or [`rollback`](Self::rollback); dropping it
/// instead closes the connection, which rolls back whatever was applied.
pub struct Transaction {
    conn: Option<tokio_rusqlite::Connection>,
    isolation: IsolationLevel,
    begun: bool,
    stats: Arc<ExecutorStats>,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("isolation", &self.isolation)
            .field("begun", &self.begun)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl Transaction {
    pub(crate) async fn start(
        conn: tokio_rusqlite::Connection,
        isolation: IsolationLevel,
        stats: Arc<ExecutorStats>,
    ) -> Result<Self, LambdaError> {
        let read_uncommitted = isolation == IsolationLevel::ReadUncommitted;
        let begin = eager_begin(isolation);
        let outcome = conn
            .call(move |conn| {
                let result = (|| -> rusqlite::Result<()> {
                    conn.pragma_update(None, "read_uncommitted", read_uncommitted)?;
                    if let Some(sql) = begin {
                        conn.execute_batch(sql)?;
                    }
                    Ok(())
                })();
                Ok::<_, rusqlite::Error>(result)
            })
            .await
            .map_err(map_tr_err)?;
        outcome.map_err(|e| statement_err(begin.unwrap_or("PRAGMA read_uncommitted"), e))?;

        debug!(%isolation, eager = begin.is_some(), "transaction started");
        Ok(Self {
            conn: Some(conn),
            isolation,
            begun: begin.is_some(),
            stats,
        })
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    /// Whether `BEGIN` has been issued on the connection yet.
    pub fn has_begun(&self) -> bool {
        self.begun
    }

    fn connection(&self) -> Result<tokio_rusqlite::Connection, LambdaError> {
        self.conn
            .clone()
            .ok_or_else(|| LambdaError::Internal("transaction already finished".to_string()))
    }

    async fn run<R: Send + 'static>(
        &mut self,
        statement: &str,
        params: Params,
        op: StatementOp<R>,
    ) -> Result<R, LambdaError> {
        let conn = self.connection()?;
        let lazy = !self.begun;
        let sql = statement.to_string();
        let (began, outcome) = conn
            .call(move |conn| {
                let mut began = false;
                let result = (|| -> rusqlite::Result<R> {
                    let mut stmt = conn.prepare(&sql)?;
                    if lazy && !stmt.readonly() {
                        conn.execute_batch("BEGIN DEFERRED")?;
                        began = true;
                    }
                    op(&mut stmt, &params)
                })();
                Ok::<_, rusqlite::Error>((began, result))
            })
            .await
            .map_err(map_tr_err)?;

        if began {
            self.begun = true;
            debug!(isolation = %self.isolation, "transaction begun before first write");
        }
        outcome.map_err(|e| {
            warn!(statement = %statement.trim(), error = %e, "statement failed in transaction");
            statement_err(statement, e)
        })
    }

    /// Run one statement and return the affected row count.
    pub async fn execute(&mut self, statement: &str, params: Params) -> Result<usize, LambdaError> {
        self.stats.record_statement();
        let affected = self
            .run(statement, params, |stmt, params| {
                stmt.execute(params.as_named().as_slice())
            })
            .await?;
        debug!(statement = %statement.trim(), affected, "statement executed in transaction");
        Ok(affected)
    }

    /// Run an insert and return the id the store assigned.
    pub async fn insert(&mut self, statement: &str, params: Params) -> Result<EntityId, LambdaError> {
        self.stats.record_statement();
        let id = self
            .run(statement, params, |stmt, params| {
                stmt.insert(params.as_named().as_slice())
            })
            .await?;
        debug!(statement = %statement.trim(), id, "row inserted in transaction");
        Ok(EntityId(id))
    }

    /// Run a query and collect every row.
    pub async fn query(&mut self, statement: &str, params: Params) -> Result<RowSet, LambdaError> {
        self.stats.record_query();
        let rows = self
            .run(statement, params, |stmt, params| {
                RowSet::collect(stmt, &params.as_named())
            })
            .await?;
        debug!(statement = %statement.trim(), rows = rows.len(), "query executed in transaction");
        Ok(rows)
    }

    /// First column of the first row, or `None`.
    pub async fn query_scalar<N: FromSql>(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<Option<N>, LambdaError> {
        let rows = self.query(statement, params).await?;
        scalar_from(&rows, statement)
    }

    /// Run statements in order inside this transaction.
    ///
    /// Stops at the first failure and reports its zero-based position as
    /// [`LambdaError::TransactionAborted`]. Commit or roll back is left to the
    /// caller.
    pub async fn execute_batch(
        &mut self,
        statements: Vec<(String, Params)>,
    ) -> Result<usize, LambdaError> {
        let mut total = 0;
        for (index, (statement, params)) in statements.into_iter().enumerate() {
            total += self.execute(&statement, params).await.map_err(|e| {
                LambdaError::TransactionAborted {
                    index,
                    source: Box::new(e),
                }
            })?;
        }
        Ok(total)
    }

    /// Commit and release the connection.
    pub async fn commit(mut self) -> Result<(), LambdaError> {
        self.finish("COMMIT").await?;
        self.stats.record_commit();
        debug!(isolation = %self.isolation, "transaction committed");
        Ok(())
    }

    /// Roll back and release the connection.
    pub async fn rollback(mut self) -> Result<(), LambdaError> {
        self.finish("ROLLBACK").await?;
        self.stats.record_rollback();
        debug!(isolation = %self.isolation, "transaction rolled back");
        Ok(())
    }

    async fn finish(&mut self, sql: &'static str) -> Result<(), LambdaError> {
        let conn = self.connection()?;
        // Lazy levels may never have issued BEGIN.
        let outcome = conn
            .call(move |conn| {
                let result = if conn.is_autocommit() {
                    Ok(())
                } else {
                    conn.execute_batch(sql)
                };
                Ok::<_, rusqlite::Error>(result)
            })
            .await
            .map_err(map_tr_err)?;
        outcome.map_err(|e| statement_err(sql, e))?;
        self.conn = None;
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.conn.take().is_some() {
            self.stats.record_rollback();
            warn!(isolation = %self.isolation, "transaction dropped while open, rolling back");
        }
    }
}
