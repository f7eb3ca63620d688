// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Files are merged system-wide first, then the user's XDG config, then
//! `./lambda.toml`; `LAMBDA_<SECTION>_<KEY>` environment variables win over
//! all of them.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::model::LambdaConfig;

/// Candidate config files, lowest precedence first.
pub fn config_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from("/etc/lambda/lambda.toml")];
    if let Some(dir) = dirs::config_dir() {
        files.push(dir.join("lambda").join("lambda.toml"));
    }
    files.push(PathBuf::from("lambda.toml"));
    files
}

/// Load configuration from [`config_files`] with env var overrides.
pub fn load_config() -> Result<LambdaConfig, figment::Error> {
    let mut figment = defaults();
    for path in config_files() {
        if path.is_file() {
            debug!(path = %path.display(), "config file found");
            figment = figment.merge(Toml::file(&path));
        } else {
            debug!(path = %path.display(), "config file not present, skipped");
        }
    }
    figment.merge(env_provider()).extract()
}

/// Load configuration from a TOML string only (no file lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<LambdaConfig, figment::Error> {
    defaults().merge(Toml::string(toml_content)).extract()
}

/// Load configuration from one explicit file, still honouring env vars.
///
/// Unlike the standard lookup, a missing file is an error here.
pub fn load_config_from_path(path: &Path) -> Result<LambdaConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "config file {} does not exist",
            path.display()
        )));
    }
    debug!(path = %path.display(), "loading explicit config file");
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

fn defaults() -> Figment {
    Figment::new().merge(Serialized::defaults(LambdaConfig::default()))
}

/// `LAMBDA_STORAGE_DATABASE_PATH` maps to `storage.database_path`.
///
/// Only the first underscore after a known section name becomes a dot, since
/// key names contain underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("LAMBDA_").map(|key| {
        let key = key.as_str();
        LambdaConfig::SECTIONS
            .iter()
            .find_map(|section| {
                key.strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key.to_string())
            .into()
    })
}
