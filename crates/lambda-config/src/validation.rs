// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, positive timeouts and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::LambdaConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LambdaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.busy_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.busy_timeout_ms must be greater than zero".to_string(),
        });
    }

    if config.showcase.target_username.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "showcase.target_username must not be empty".to_string(),
        });
    }

    let credit = config.showcase.replacement_credit;
    if !credit.is_finite() || credit < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "showcase.replacement_credit must be a non-negative number, got {credit}"
            ),
        });
    }

    let level = config.logging.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.log_level `{}` is not one of: {}",
                config.logging.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = LambdaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = LambdaConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn zero_busy_timeout_fails_validation() {
        let mut config = LambdaConfig::default();
        config.storage.busy_timeout_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "busy_timeout_ms"));
    }

    #[test]
    fn negative_replacement_credit_fails_validation() {
        let mut config = LambdaConfig::default();
        config.showcase.replacement_credit = -1.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "replacement_credit"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = LambdaConfig::default();
        config.storage.database_path = String::new();
        config.showcase.target_username = String::new();
        config.logging.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_message(&errors, "log_level"));
    }
}
