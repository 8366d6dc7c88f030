//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check required lookup fields (table, key attribute, region)
//! - Compile extraction patterns once, before traffic is accepted
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::{ExtractorConfig, RouterConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstreams.matched", &config.upstreams.matched);
    check_address(&mut errors, "upstreams.unmatched", &config.upstreams.unmatched);

    let lookup = &config.lookup;
    if lookup.table_name.trim().is_empty() {
        errors.push(ValidationError::new("lookup.table_name", "must not be empty"));
    }
    if lookup.key_name.trim().is_empty() {
        errors.push(ValidationError::new("lookup.key_name", "must not be empty"));
    }
    if lookup.timeout_ms == 0 {
        errors.push(ValidationError::new("lookup.timeout_ms", "must be greater than zero"));
    }

    if let ExtractorConfig::Regex { pattern, strip_pattern } = &lookup.extractor {
        if pattern.is_empty() {
            errors.push(ValidationError::new("lookup.extractor.pattern", "must not be empty"));
        } else if let Err(e) = Regex::new(pattern) {
            errors.push(ValidationError::new("lookup.extractor.pattern", e.to_string()));
        }
        if !strip_pattern.is_empty() {
            if let Err(e) = Regex::new(strip_pattern) {
                errors.push(ValidationError::new("lookup.extractor.strip_pattern", e.to_string()));
            }
        }
    }

    let store = &config.store;
    if store.region.trim().is_empty() {
        errors.push(ValidationError::new("store.region", "must not be empty"));
    }
    match (&store.access_key, &store.secret_key) {
        (Some(_), None) => errors.push(ValidationError::new(
            "store.secret_key",
            "required when access_key is set",
        )),
        (None, Some(_)) => errors.push(ValidationError::new(
            "store.access_key",
            "required when secret_key is set",
        )),
        (Some(a), Some(s)) if a.is_empty() || s.is_empty() => errors.push(ValidationError::new(
            "store.access_key",
            "static credentials must not be empty",
        )),
        _ => {}
    }
    if let Some(endpoint) = &store.endpoint_url {
        if let Err(e) = url::Url::parse(endpoint) {
            errors.push(ValidationError::new("store.endpoint_url", e.to_string()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    let obs = &config.observability;
    if !matches!(obs.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}', expected 'pretty' or 'json'", obs.log_format),
        ));
    }
    if obs.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &obs.metrics_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            field,
            format!("'{}' is not a valid socket address", value),
        ));
    }
}
