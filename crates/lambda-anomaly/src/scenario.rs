// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two-transaction scenario.
//!
//! 1. Resolve the target user's id by username.
//! 2. The reader begins at the requested level and reads the credit.
//! 3. A writer on its own connection overwrites the credit and commits,
//!    while the reader stalls inside its transaction.
//! 4. The reader reads again and commits.
//! 5. The original credit is put back in a separate transaction.

use std::time::Duration;

use lambda_config::model::ShowcaseConfig;
use lambda_core::{EntityId, EntityKind, IsolationLevel, LambdaError};
use lambda_storage::{Database, Params, Transaction, TransactionUnit, User, is_busy};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::report::{AnomalyReport, CleanupOutcome, WriterOutcome};

/// Isolation level of the writer and of the cleanup transaction.
const AUXILIARY_ISOLATION: IsolationLevel = IsolationLevel::ReadCommitted;

/// Parameters of one showcase run.
#[derive(Debug, Clone)]
pub struct Showcase {
    pub target_username: String,
    /// How long the reader waits between its two reads.
    pub stall: Duration,
    /// Credit the writer commits.
    pub replacement_credit: f64,
}

impl From<&ShowcaseConfig> for Showcase {
    fn from(config: &ShowcaseConfig) -> Self {
        Self {
            target_username: config.target_username.clone(),
            stall: config.stall(),
            replacement_credit: config.replacement_credit,
        }
    }
}

impl Default for Showcase {
    fn default() -> Self {
        Self::from(&ShowcaseConfig::default())
    }
}

/// Run the scenario with the reader at `isolation`.
///
/// A writer refused by the store is reported, not returned as an error, and
/// so is a failed cleanup. Errors are returned for a missing user and for
/// failures of the reader or the writer. Once the writer has committed, its
/// change is undone before any of those errors is returned.
pub async fn run_showcase(
    db: &Database,
    showcase: &Showcase,
    isolation: IsolationLevel,
) -> Result<AnomalyReport, LambdaError> {
    let user_id = resolve_user(db, &showcase.target_username).await?;
    info!(
        username = %showcase.target_username,
        user = %user_id,
        %isolation,
        "showcase starting"
    );

    let mut reader = db.begin(isolation).await?;
    let initial = match read_credit(&mut reader, user_id).await {
        Ok(credit) => credit,
        Err(e) => {
            abandon(reader).await;
            return Err(e);
        }
    };
    info!(credit = initial, "reader: first read");

    let mut writer = spawn_writer(db.clone(), user_id, showcase.replacement_credit);

    info!(stall_ms = showcase.stall.as_millis() as u64, "reader: stalling inside its transaction");
    let early = tokio::time::timeout(showcase.stall, &mut writer).await.ok();
    if early.is_some() {
        info!("reader: writer finished during the stall");
    }

    let reread = finish_reader(reader, user_id).await;

    let during_stall = early.is_some();
    let joined = match early {
        Some(result) => result,
        None => writer.await,
    };
    let writer = classify_writer(joined, during_stall, showcase.replacement_credit);

    // The writer's change is undone whenever it landed, even if the reader failed.
    let cleanup = match &writer {
        Ok(outcome) if outcome.committed() => restore_credit(db, user_id, initial).await,
        _ => CleanupOutcome::Skipped,
    };
    let reread = reread?;
    let writer = writer?;

    let report = AnomalyReport {
        isolation,
        user_id,
        initial,
        reread,
        writer,
        cleanup,
    };
    if report.anomaly_observed() {
        info!(initial, reread, "non-repeatable read observed");
    } else {
        info!(initial, reread, "reads repeatable");
    }
    if !report.consistent_with_isolation() {
        warn!(%isolation, "level promised repeatable reads but the reads differ");
    }
    Ok(report)
}

async fn resolve_user(db: &Database, username: &str) -> Result<EntityId, LambdaError> {
    db.execute_scalar::<i64>(
        User::SELECT_ID_BY_USERNAME,
        Params::new().with("@Username", username.to_string()),
    )
    .await?
    .map(EntityId)
    .ok_or_else(|| LambdaError::NotFound {
        entity: EntityKind::User,
        detail: format!("username {username}"),
    })
}

async fn read_credit(tx: &mut Transaction, user_id: EntityId) -> Result<f64, LambdaError> {
    tx.query_scalar::<f64>(User::SELECT_CREDIT, Params::new().with("@ID", user_id.get()))
        .await?
        .ok_or_else(|| LambdaError::NotFound {
            entity: EntityKind::User,
            detail: format!("id {user_id}"),
        })
}

fn set_credit(user_id: EntityId, credit: f64) -> TransactionUnit {
    TransactionUnit::new(AUXILIARY_ISOLATION).statement(
        User::SET_CREDIT,
        Params::new()
            .with("@Credit", credit)
            .with("@ID", user_id.get()),
    )
}

fn spawn_writer(
    db: Database,
    user_id: EntityId,
    credit: f64,
) -> JoinHandle<Result<(), LambdaError>> {
    tokio::spawn(async move {
        info!(credit, "writer: updating credit on its own connection");
        db.execute_transaction(set_credit(user_id, credit)).await
    })
}

/// Second read and commit. The reader's transaction is over either way.
async fn finish_reader(mut reader: Transaction, user_id: EntityId) -> Result<f64, LambdaError> {
    let reread = match read_credit(&mut reader, user_id).await {
        Ok(credit) => credit,
        Err(e) => {
            warn!(error = %e, "reader: second read failed");
            abandon(reader).await;
            return Err(e);
        }
    };
    info!(credit = reread, "reader: second read");
    reader.commit().await?;
    info!("reader: committed");
    Ok(reread)
}

fn classify_writer(
    joined: Result<Result<(), LambdaError>, tokio::task::JoinError>,
    during_stall: bool,
    credit: f64,
) -> Result<WriterOutcome, LambdaError> {
    match joined {
        Ok(Ok(())) => {
            info!(credit, during_stall, "writer: committed");
            Ok(WriterOutcome::Committed { during_stall })
        }
        Ok(Err(e)) if is_busy(&e) => {
            info!(error = %e, "writer: blocked by the reader's lock");
            Ok(WriterOutcome::Blocked {
                reason: e.to_string(),
            })
        }
        Ok(Err(e)) => {
            warn!(error = %e, "writer: failed");
            Err(e)
        }
        Err(e) => Err(LambdaError::Internal(format!("writer task failed: {e}"))),
    }
}

async fn abandon(reader: Transaction) {
    if let Err(e) = reader.rollback().await {
        warn!(error = %e, "reader: rollback failed");
    }
}

async fn restore_credit(db: &Database, user_id: EntityId, credit: f64) -> CleanupOutcome {
    match db.execute_transaction(set_credit(user_id, credit)).await {
        Ok(()) => {
            info!(credit, "cleanup: original credit restored");
            CleanupOutcome::Restored { credit }
        }
        Err(e) => {
            warn!(error = %e, "cleanup: restoring the original credit failed");
            CleanupOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
