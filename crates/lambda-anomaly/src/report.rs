// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcome of one showcase run.

use std::fmt;

use lambda_core::{EntityId, IsolationLevel};

/// What happened to the concurrent writer.
#[derive(Debug, Clone, PartialEq)]
pub enum WriterOutcome {
    /// The write committed. `during_stall` is false when it only got through
    /// after the reader had committed.
    Committed { during_stall: bool },
    /// The store refused the write because the reader held the lock.
    Blocked { reason: String },
}

impl WriterOutcome {
    pub fn committed(&self) -> bool {
        matches!(self, WriterOutcome::Committed { .. })
    }
}

impl fmt::Display for WriterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriterOutcome::Committed { during_stall: true } => {
                f.write_str("writer committed during the stall")
            }
            WriterOutcome::Committed { during_stall: false } => {
                f.write_str("writer committed after the reader")
            }
            WriterOutcome::Blocked { .. } => f.write_str("writer blocked"),
        }
    }
}

/// Result of putting the original credit back.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanupOutcome {
    /// The original value was written back.
    Restored { credit: f64 },
    /// The writer never committed, so there was nothing to undo.
    Skipped,
    /// Restoring failed. The stored credit is left as the writer set it.
    Failed { reason: String },
}

impl fmt::Display for CleanupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupOutcome::Restored { credit } => write!(f, "cleanup restored {credit:.2}"),
            CleanupOutcome::Skipped => f.write_str("cleanup skipped"),
            CleanupOutcome::Failed { reason } => write!(f, "cleanup failed: {reason}"),
        }
    }
}

/// Both reads of one run and what the writer and cleanup did.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyReport {
    pub isolation: IsolationLevel,
    pub user_id: EntityId,
    /// Credit at the reader's first read.
    pub initial: f64,
    /// Credit at the reader's second read, inside the same transaction.
    pub reread: f64,
    pub writer: WriterOutcome,
    pub cleanup: CleanupOutcome,
}

impl AnomalyReport {
    /// The two reads disagree.
    pub fn anomaly_observed(&self) -> bool {
        self.initial != self.reread
    }

    /// False only when a level that promises repeatable reads showed the anomaly.
    pub fn consistent_with_isolation(&self) -> bool {
        !(self.anomaly_observed() && self.isolation.guarantees_repeatable_reads())
    }
}

impl fmt::Display for AnomalyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.anomaly_observed() {
            "non-repeatable read observed"
        } else {
            "reads repeatable"
        };
        write!(
            f,
            "{}: read {:.2} then {:.2} ({verdict}); {}; {}",
            self.isolation, self.initial, self.reread, self.writer, self.cleanup
        )
    }
}
