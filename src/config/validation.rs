//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Root path must be absolute
//! - Template pattern must be present, unambiguous and compile
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::config::schema::{AppConfig, ConventionMode};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("routing.path is required")]
    MissingPath,

    #[error("routing.path {0} is not absolute")]
    RelativePath(String),

    #[error("routing.extensions must not be empty")]
    NoExtensions,

    #[error("routing.extensions entry {0:?} must not start with a dot")]
    DottedExtension(String),

    #[error("routing.template needs exactly one of `pattern` or `regex`")]
    AmbiguousPattern,

    #[error("routing.template.regex is invalid: {0}")]
    InvalidRegex(String),

    #[error("routing.template.export must not be empty")]
    EmptyExport,

    #[error("server.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.log_level {0:?} is not a level")]
    InvalidLogLevel(String),
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let routing = &config.routing;

    if routing.path.as_os_str().is_empty() {
        errors.push(ValidationError::MissingPath);
    } else if !routing.path.is_absolute() {
        errors.push(ValidationError::RelativePath(
            routing.path.display().to_string(),
        ));
    }

    match routing.mode {
        ConventionMode::Standard => {
            if routing.extensions.is_empty() {
                errors.push(ValidationError::NoExtensions);
            }
            for ext in routing.extensions.iter().filter(|e| e.starts_with('.')) {
                errors.push(ValidationError::DottedExtension(ext.clone()));
            }
        }
        ConventionMode::Template => {
            let template = &routing.template;
            match (&template.pattern, &template.regex) {
                (Some(_), None) => {}
                (None, Some(re)) => {
                    if let Err(e) = regex::Regex::new(re) {
                        errors.push(ValidationError::InvalidRegex(e.to_string()));
                    }
                }
                _ => errors.push(ValidationError::AmbiguousPattern),
            }
            if template.export.is_empty() {
                errors.push(ValidationError::EmptyExport);
            }
        }
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.observability.log_level.parse::<LevelFilter>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
