// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Non-repeatable read demonstration.
//!
//! A reading transaction observes a user's credit twice while a second
//! connection overwrites it in between. Whether the two reads agree depends
//! on the isolation level the reader runs at.

pub mod report;
pub mod scenario;

pub use report::{AnomalyReport, CleanupOutcome, WriterOutcome};
pub use scenario::{Showcase, run_showcase};
