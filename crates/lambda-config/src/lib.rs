// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Lambda data-access layer.
//!
//! `lambda.toml` has four sections: `[storage]`, `[transactions]`,
//! `[showcase]` and `[logging]`. Unknown keys are rejected with a suggestion,
//! and every semantic error is collected before reporting.
//!
//! # Usage
//!
//! ```no_run
//! use lambda_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use tracing::warn;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{config_files, load_config, load_config_from_path, load_config_from_str};
pub use model::LambdaConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error the TOML sources are re-read so diagnostics can point
/// at the offending line.
pub fn load_and_validate() -> Result<LambdaConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config).map_err(rejected)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(rejected(diagnostic::figment_to_config_errors(err, &toml_sources)))
        }
    }
}

/// Load configuration from an explicit file path and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<LambdaConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config).map_err(rejected)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(rejected(diagnostic::figment_to_config_errors(err, &sources)))
        }
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<LambdaConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config).map_err(rejected)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(rejected(diagnostic::figment_to_config_errors(err, &sources)))
        }
    }
}

/// Contents of the config files that exist, keyed the way figment names them.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_files()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let absolute = std::path::absolute(&path).unwrap_or(path);
            Some((absolute.display().to_string(), content))
        })
        .collect()
}

fn rejected(errors: Vec<ConfigError>) -> Vec<ConfigError> {
    warn!(count = errors.len(), "configuration rejected");
    errors
}
