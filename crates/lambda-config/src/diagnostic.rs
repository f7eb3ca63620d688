// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Unknown keys and sections point at their line in `lambda.toml` and carry a
//! Jaro-Winkler "did you mean?" suggestion. Bad values say what the key
//! accepts.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::LambdaConfig;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

const ISOLATION_LEVELS: &str = "read_uncommitted, read_committed, repeatable_read, serializable";

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key or section `lambda.toml` does not define.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(lambda::config::unknown_key),
        help("{}", unknown_key_help(section.as_deref(), suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Enclosing section, `None` for an unknown top-level section.
        section: Option<String>,
        suggestion: Option<String>,
        /// Keys accepted at that level, comma separated.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type, or not one of the accepted variants.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(lambda::config::invalid_value), help("{accepted}"))]
    InvalidValue {
        key: String,
        detail: String,
        /// What the key accepts.
        accepted: String,
    },

    /// A value that parsed but breaks a semantic rule.
    #[error("validation error: {message}")]
    #[diagnostic(code(lambda::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(lambda::config::other))]
    Other(String),
}

fn unknown_key_help(section: Option<&str>, suggestion: Option<&str>, valid_keys: &str) -> String {
    let scope = match section {
        Some(section) => format!("keys in [{section}]: {valid_keys}"),
        None => format!("sections: {}", LambdaConfig::SECTIONS.join(", ")),
    };
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {scope}"),
        None => scope,
    }
}

/// What a key accepts, for the help line of [`ConfigError::InvalidValue`].
fn accepted_values(key: &str, expected: &str) -> String {
    if key == "transactions.isolation_level" {
        format!("use one of {ISOLATION_LEVELS} (upper case like READ_COMMITTED also works)")
    } else {
        format!("expected {expected}")
    }
}

/// Convert a `figment::Error` into one [`ConfigError`] per contained error.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            let key = path.join(".");
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = find_source_span(&error, &path, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section: path.first().cloned(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => ConfigError::InvalidValue {
                    accepted: accepted_values(&key, expected),
                    detail: format!("found {actual}"),
                    key,
                },
                Kind::UnknownVariant(actual, _) => ConfigError::InvalidValue {
                    accepted: accepted_values(&key, "a known variant"),
                    detail: format!("`{actual}` is not supported"),
                    key,
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn find_source_span(
    error: &figment::error::Error,
    path: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(figment::Source::File(file)) = error.metadata.as_ref().and_then(|m| m.source.as_ref())
    else {
        return (None, None);
    };
    let file = file.display().to_string();
    let Some((name, content)) = toml_sources.iter().find(|(p, _)| *p == file) else {
        return (None, None);
    };
    match find_key_offset(content, path, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` in TOML `content`.
///
/// With an empty `path` the field is a section, found by its `[field]`
/// header. Otherwise the key is searched below the `[section]` header.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let Some(section) = path.first() else {
        return content.find(&format!("[{field}]")).map(|pos| pos + 1);
    };
    let header = format!("[{section}]");
    let start = content.find(&header)? + header.len();

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            return None;
        }
        let follows = trimmed.strip_prefix(field).and_then(|rest| rest.chars().next());
        if matches!(follows, Some(' ' | '=' | '\t')) {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }
    None
}

/// Closest key above the similarity threshold, if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render errors to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
