// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and the
//! statement executor.
//!
//! [`Database`] owns one long-lived `tokio-rusqlite` connection for
//! autocommit statements. Every transaction gets a dedicated connection (see
//! [`Database::begin`]) so two transactions can interleave the way the
//! isolation showcase needs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lambda_config::model::StorageConfig;
use lambda_core::{EntityId, IsolationLevel, LambdaError};
use rusqlite::ErrorCode;
use rusqlite::types::FromSql;
use tracing::{debug, error, info};

use crate::params::Params;
use crate::rowset::RowSet;
use crate::transaction::{Transaction, TransactionUnit};

/// Convert a tokio-rusqlite error into LambdaError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> LambdaError {
    LambdaError::Storage {
        source: Box::new(e),
    }
}

/// Attach the failing statement text to a driver error.
pub(crate) fn statement_err(statement: &str, e: rusqlite::Error) -> LambdaError {
    LambdaError::Statement {
        statement: statement.trim().to_string(),
        source: Box::new(e),
    }
}

/// Whether an error was caused by another connection holding the lock.
///
/// Looks through [`LambdaError::TransactionAborted`] to the failing statement.
pub fn is_busy(err: &LambdaError) -> bool {
    match err {
        LambdaError::Statement { source, .. } => source
            .downcast_ref::<rusqlite::Error>()
            .and_then(|e| e.sqlite_error_code())
            .is_some_and(|code| {
                matches!(code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            }),
        LambdaError::TransactionAborted { source, .. } => is_busy(source),
        _ => false,
    }
}

/// Settings applied to every connection the executor opens.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub wal_mode: bool,
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            wal_mode: true,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&StorageConfig> for ConnectionOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            wal_mode: config.wal_mode,
            busy_timeout: config.busy_timeout(),
        }
    }
}

/// Counters for executor activity.
#[derive(Debug, Default)]
pub struct ExecutorStats {
    statements: AtomicU64,
    queries: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
}

/// Point-in-time copy of [`ExecutorStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub statements: u64,
    pub queries: u64,
    pub committed: u64,
    pub rolled_back: u64,
}

impl ExecutorStats {
    pub(crate) fn record_statement(&self) {
        self.statements.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rollback(&self) {
        self.rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            statements: self.statements.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
        }
    }
}

/// The statement executor.
///
/// Cheap to clone; clones share the autocommit connection and the stats.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
    options: ConnectionOptions,
    stats: Arc<ExecutorStats>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Open a database file with default connection options.
    ///
    /// Applies PRAGMAs and runs the embedded migrations before returning.
    pub async fn open(path: &str) -> Result<Self, LambdaError> {
        Self::open_with(path, ConnectionOptions::default()).await
    }

    /// Open the database described by the `[storage]` config section.
    pub async fn open_with_config(config: &StorageConfig) -> Result<Self, LambdaError> {
        Self::open_with(&config.database_path, ConnectionOptions::from(config)).await
    }

    pub async fn open_with(path: &str, options: ConnectionOptions) -> Result<Self, LambdaError> {
        // Journal mode is persistent in the file, so bootstrap once on a
        // plain connection before the shared one opens.
        let bootstrap_path = path.to_string();
        let bootstrap_options = options.clone();
        tokio::task::spawn_blocking(move || -> Result<(), LambdaError> {
            let mut conn =
                rusqlite::Connection::open(&bootstrap_path).map_err(|e| LambdaError::Storage {
                    source: Box::new(e),
                })?;
            configure(&conn, &bootstrap_options).map_err(|e| LambdaError::Storage {
                source: Box::new(e),
            })?;
            if bootstrap_options.wal_mode {
                let mode: String = conn
                    .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                    .map_err(|e| LambdaError::Storage {
                        source: Box::new(e),
                    })?;
                debug!(journal_mode = %mode, "journal mode set");
            }
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| LambdaError::Internal(format!("database bootstrap task failed: {e}")))??;

        let conn = open_connection(path, &options).await?;
        info!(path = %path, wal = options.wal_mode, "database opened");

        Ok(Self {
            conn,
            path: path.to_string(),
            options,
            stats: Arc::new(ExecutorStats::default()),
        })
    }

    /// The shared autocommit connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn stats_handle(&self) -> Arc<ExecutorStats> {
        Arc::clone(&self.stats)
    }

    /// Run one statement in autocommit mode and return the affected row count.
    pub async fn execute_non_query(
        &self,
        statement: &str,
        params: Params,
    ) -> Result<usize, LambdaError> {
        self.stats.record_statement();
        let sql = statement.to_string();
        let outcome = self
            .conn
            .call(move |conn| {
                Ok::<_, rusqlite::Error>(
                    conn.prepare(&sql)
                        .and_then(|mut stmt| stmt.execute(params.as_named().as_slice())),
                )
            })
            .await
            .map_err(map_tr_err)?;
        match outcome {
            Ok(affected) => {
                debug!(statement = %statement.trim(), affected, "statement executed");
                Ok(affected)
            }
            Err(e) => {
                error!(statement = %statement.trim(), error = %e, "statement failed");
                Err(statement_err(statement, e))
            }
        }
    }

    /// Run an insert and return the store-generated id from the same connection.
    pub async fn execute_insert(
        &self,
        statement: &str,
        params: Params,
    ) -> Result<EntityId, LambdaError> {
        self.stats.record_statement();
        let sql = statement.to_string();
        let outcome = self
            .conn
            .call(move |conn| {
                Ok::<_, rusqlite::Error>(
                    conn.prepare(&sql)
                        .and_then(|mut stmt| stmt.execute(params.as_named().as_slice()))
                        .map(|_| conn.last_insert_rowid()),
                )
            })
            .await
            .map_err(map_tr_err)?;
        match outcome {
            Ok(id) => {
                debug!(statement = %statement.trim(), id, "row inserted");
                Ok(EntityId(id))
            }
            Err(e) => {
                error!(statement = %statement.trim(), error = %e, "insert failed");
                Err(statement_err(statement, e))
            }
        }
    }

    /// Run a query in autocommit mode and collect every row.
    pub async fn execute_query(
        &self,
        statement: &str,
        params: Params,
    ) -> Result<RowSet, LambdaError> {
        self.stats.record_query();
        let sql = statement.to_string();
        let outcome = self
            .conn
            .call(move |conn| {
                Ok::<_, rusqlite::Error>(
                    conn.prepare(&sql)
                        .and_then(|mut stmt| RowSet::collect(&mut stmt, &params.as_named())),
                )
            })
            .await
            .map_err(map_tr_err)?;
        match outcome {
            Ok(rows) => {
                debug!(statement = %statement.trim(), rows = rows.len(), "query executed");
                Ok(rows)
            }
            Err(e) => {
                error!(statement = %statement.trim(), error = %e, "query failed");
                Err(statement_err(statement, e))
            }
        }
    }

    /// First column of the first row, or `None` for no row or NULL.
    pub async fn execute_scalar<N: FromSql>(
        &self,
        statement: &str,
        params: Params,
    ) -> Result<Option<N>, LambdaError> {
        let rows = self.execute_query(statement, params).await?;
        scalar_from(&rows, statement)
    }

    /// Like [`execute_scalar`](Self::execute_scalar), but yields `N::default()`
    /// on any failure or missing value. Failures are logged.
    pub async fn execute_scalar_or_default<N: FromSql + Default>(
        &self,
        statement: &str,
        params: Params,
    ) -> N {
        match self.execute_scalar(statement, params).await {
            Ok(Some(value)) => value,
            Ok(None) => N::default(),
            Err(e) => {
                error!(error = %e, "scalar query failed, using default");
                N::default()
            }
        }
    }

    /// Open a caller-managed transaction on its own connection.
    pub async fn begin(&self, isolation: IsolationLevel) -> Result<Transaction, LambdaError> {
        let conn = open_connection(&self.path, &self.options).await?;
        Transaction::start(conn, isolation, self.stats_handle()).await
    }

    /// Run a unit atomically on a dedicated connection.
    ///
    /// Every statement applies and the unit commits, or the first failure
    /// rolls everything back and is returned as
    /// [`LambdaError::TransactionAborted`].
    pub async fn execute_transaction(&self, unit: TransactionUnit) -> Result<(), LambdaError> {
        let isolation = unit.isolation();
        let count = unit.len();
        let mut tx = self.begin(isolation).await?;
        match tx.execute_batch(unit.into_statements()).await {
            Ok(affected) => {
                tx.commit().await?;
                info!(%isolation, statements = count, affected, "transaction committed");
                Ok(())
            }
            Err(e) => {
                error!(%isolation, error = %e, "transaction failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Checkpoint the WAL and drop the shared connection.
    pub async fn close(self) -> Result<(), LambdaError> {
        if self.options.wal_mode {
            self.conn
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

pub(crate) fn scalar_from<N: FromSql>(rows: &RowSet, statement: &str) -> Result<Option<N>, LambdaError> {
    let Some(row) = rows.first() else {
        return Ok(None);
    };
    let Some(column) = rows.columns().first() else {
        return Ok(None);
    };
    row.get::<Option<N>>(column).map_err(|e| LambdaError::Statement {
        statement: statement.trim().to_string(),
        source: Box::new(e),
    })
}

/// PRAGMAs every connection needs.
fn configure(conn: &rusqlite::Connection, options: &ConnectionOptions) -> rusqlite::Result<()> {
    conn.busy_timeout(options.busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(())
}

pub(crate) async fn open_connection(
    path: &str,
    options: &ConnectionOptions,
) -> Result<tokio_rusqlite::Connection, LambdaError> {
    let conn = tokio_rusqlite::Connection::open(path)
        .await
        .map_err(|e| LambdaError::Storage {
            source: Box::new(e),
        })?;
    let options = options.clone();
    conn.call(move |conn| configure(conn, &options))
        .await
        .map_err(map_tr_err)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_temp() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let (db, dir) = open_temp().await;
        assert!(dir.path().join("test.db").exists());
        let count: Option<i64> = db
            .execute_scalar("SELECT COUNT(*) FROM MealType", Params::new())
            .await
            .unwrap();
        assert_eq!(count, Some(3));
    }

    #[tokio::test]
    async fn journal_mode_is_wal() {
        let (db, _dir) = open_temp().await;
        let mode: Option<String> = db
            .execute_scalar("PRAGMA journal_mode", Params::new())
            .await
            .unwrap();
        assert_eq!(mode.as_deref(), Some("wal"));
    }

    #[tokio::test]
    async fn reopen_keeps_existing_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let path = path.to_str().unwrap();
        {
            let db = Database::open(path).await.unwrap();
            db.execute_non_query(
                "INSERT INTO MealType (Name) VALUES (@Name)",
                Params::new().with("@Name", "Salad".to_string()),
            )
            .await
            .unwrap();
            db.close().await.unwrap();
        }
        let db = Database::open(path).await.unwrap();
        let count: Option<i64> = db
            .execute_scalar("SELECT COUNT(*) FROM MealType", Params::new())
            .await
            .unwrap();
        assert_eq!(count, Some(4));
    }

    #[tokio::test]
    async fn execute_insert_returns_generated_id() {
        let (db, _dir) = open_temp().await;
        let id = db
            .execute_insert(
                "INSERT INTO MealType (Name) VALUES (@Name)",
                Params::new().with("@Name", "Salad".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(id, EntityId(4));
    }

    #[tokio::test]
    async fn scalar_is_none_for_no_rows() {
        let (db, _dir) = open_temp().await;
        let value: Option<i64> = db
            .execute_scalar(
                "SELECT ID FROM MealType WHERE Name = @Name",
                Params::new().with("@Name", "Nope".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn failures_are_not_masked() {
        let (db, _dir) = open_temp().await;
        let err = db
            .execute_non_query("UPDATE NoSuchTable SET X = 1", Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LambdaError::Statement { .. }));
        assert!(!is_busy(&err));

        let fallback: i64 = db
            .execute_scalar_or_default("SELECT X FROM NoSuchTable", Params::new())
            .await;
        assert_eq!(fallback, 0);
    }

    #[tokio::test]
    async fn unknown_parameter_name_is_an_error() {
        let (db, _dir) = open_temp().await;
        let err = db
            .execute_non_query(
                "INSERT INTO MealType (Name) VALUES (@Name)",
                Params::new()
                    .with("@Name", "Salad".to_string())
                    .with("@Extra", 1_i64),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LambdaError::Statement { .. }));
    }

    #[tokio::test]
    async fn stats_count_statements_and_queries() {
        let (db, _dir) = open_temp().await;
        db.execute_query("SELECT * FROM MealType", Params::new())
            .await
            .unwrap();
        db.execute_non_query("DELETE FROM MealType WHERE ID = @ID", Params::new().with("@ID", 3_i64))
            .await
            .unwrap();
        let stats = db.stats();
        assert_eq!(stats.queries, 1);
        assert_eq!(stats.statements, 1);
    }
}
