// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lambda showcase` command implementation.

use std::time::Duration;

use lambda_anomaly::{AnomalyReport, Showcase, run_showcase};
use lambda_config::model::ShowcaseConfig;
use lambda_core::{IsolationLevel, LambdaError};
use lambda_storage::Registry;
use tracing::warn;

/// Run the showcase with configured settings, `stall_ms` overriding the stall.
pub async fn run_showcase_command(
    registry: &Registry,
    config: &ShowcaseConfig,
    isolation: IsolationLevel,
    stall_ms: Option<u64>,
) -> Result<AnomalyReport, LambdaError> {
    let mut showcase = Showcase::from(config);
    if let Some(ms) = stall_ms {
        showcase.stall = Duration::from_millis(ms);
    }
    let report = run_showcase(registry.database(), &showcase, isolation).await?;
    if !report.consistent_with_isolation() {
        warn!(%isolation, "store did not honour the requested isolation level");
    }
    Ok(report)
}
