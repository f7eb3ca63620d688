// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lambda data-access layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use lambda_core::IsolationLevel;
use serde::{Deserialize, Serialize};

/// Top-level Lambda configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LambdaConfig {
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Transaction defaults.
    #[serde(default)]
    pub transactions: TransactionConfig,

    /// Non-repeatable read showcase settings.
    #[serde(default)]
    pub showcase: ShowcaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LambdaConfig {
    /// Top-level `lambda.toml` sections, also the `LAMBDA_<SECTION>_` env prefixes.
    pub const SECTIONS: [&'static str; 4] = ["storage", "transactions", "showcase", "logging"];
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode. Concurrent readers and a writer need it.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl StorageConfig {
    /// Busy timeout as a [`Duration`].
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    "lambda.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Transaction configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionConfig {
    /// Isolation level applied to transactions that do not pick their own.
    #[serde(default)]
    pub isolation_level: IsolationLevel,
}

/// Settings for the non-repeatable read showcase.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShowcaseConfig {
    /// Username whose credit balance is observed.
    #[serde(default = "default_target_username")]
    pub target_username: String,

    /// Simulated processing delay inside the reading transaction.
    #[serde(default = "default_stall_ms")]
    pub stall_ms: u64,

    /// Credit value the concurrent writer commits.
    #[serde(default = "default_replacement_credit")]
    pub replacement_credit: f64,
}

impl ShowcaseConfig {
    /// Stall as a [`Duration`].
    pub fn stall(&self) -> Duration {
        Duration::from_millis(self.stall_ms)
    }
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            target_username: default_target_username(),
            stall_ms: default_stall_ms(),
            replacement_credit: default_replacement_credit(),
        }
    }
}

fn default_target_username() -> String {
    "admin".to_string()
}

fn default_stall_ms() -> u64 {
    5_000
}

fn default_replacement_credit() -> f64 {
    500.0
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
