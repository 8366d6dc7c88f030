//! Host record matching.
//!
//! # Responsibilities
//! - Read the hostname from the Host header (URI authority as fallback)
//! - Derive the lookup key via the configured `KeyExtractor`
//! - Check the key against the `RecordStore` under a deadline
//! - Collapse the outcome to a routing decision per `FailurePolicy`
//!
//! # Design Decisions
//! - Host comparison keeps case; the store compares keys verbatim
//! - Port suffix is dropped before extraction
//! - Lookup failures stay visible in `MatchOutcome` until the boundary
//! - Store handle is injected and never mutated after construction

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, request::Parts};
use thiserror::Error;

use crate::config::{FailurePolicy, LookupConfig};
use crate::observability::metrics;
use crate::routing::extractor::{build_extractor, ExtractorError, KeyExtractor};
use crate::store::{RecordStore, StoreError};

/// Result of evaluating one hostname.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// The hostname did not yield a key.
    NoKey,
    /// A record exists for the key.
    Matched { key: String },
    /// The store confirmed there is no record.
    NotFound { key: String },
    /// The store could not answer.
    LookupFailed { key: String, error: StoreError },
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            MatchOutcome::NoKey => None,
            MatchOutcome::Matched { key }
            | MatchOutcome::NotFound { key }
            | MatchOutcome::LookupFailed { key, .. } => Some(key.as_str()),
        }
    }

    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            MatchOutcome::NoKey => "no_key",
            MatchOutcome::Matched { .. } => "matched",
            MatchOutcome::NotFound { .. } => "not_found",
            MatchOutcome::LookupFailed { .. } => "lookup_failed",
        }
    }
}

/// Error surfaced by [`HostRecordMatcher::decide`] under `FailClosed`.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("lookup for key '{key}' failed: {source}")]
    Lookup {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Matches requests whose host key has a record in the store.
#[derive(Debug)]
pub struct HostRecordMatcher {
    table_name: String,
    key_name: String,
    extractor: Box<dyn KeyExtractor>,
    store: Arc<dyn RecordStore>,
    policy: FailurePolicy,
    timeout: Duration,
}

impl HostRecordMatcher {
    /// Create a fail-open matcher with a 2 second lookup deadline.
    pub fn new(
        table_name: impl Into<String>,
        key_name: impl Into<String>,
        extractor: Box<dyn KeyExtractor>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            key_name: key_name.into(),
            extractor,
            store,
            policy: FailurePolicy::FailOpen,
            timeout: Duration::from_secs(2),
        }
    }

    /// Build from validated lookup configuration.
    pub fn from_config(
        config: &LookupConfig,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, ExtractorError> {
        let extractor = build_extractor(&config.extractor)?;
        Ok(Self::new(&config.table_name, &config.key_name, extractor, store)
            .with_policy(config.on_error)
            .with_timeout(Duration::from_millis(config.timeout_ms)))
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Evaluate a bare hostname (no port).
    pub async fn evaluate(&self, host: &str) -> MatchOutcome {
        let start = Instant::now();

        let outcome = match self.extractor.extract(host) {
            None => MatchOutcome::NoKey,
            Some(key) => {
                let lookup = self.store.contains(&self.table_name, &self.key_name, &key);
                match tokio::time::timeout(self.timeout, lookup).await {
                    Ok(Ok(true)) => MatchOutcome::Matched { key },
                    Ok(Ok(false)) => MatchOutcome::NotFound { key },
                    Ok(Err(error)) => MatchOutcome::LookupFailed { key, error },
                    Err(_) => MatchOutcome::LookupFailed {
                        key,
                        error: StoreError::Timeout(self.timeout),
                    },
                }
            }
        };

        match &outcome {
            MatchOutcome::LookupFailed { key, error } => tracing::warn!(
                host = %host,
                key = %key,
                table = %self.table_name,
                error_kind = error.kind(),
                error = %error,
                "Host record lookup failed"
            ),
            other => tracing::debug!(
                host = %host,
                key = other.key().unwrap_or(""),
                table = %self.table_name,
                outcome = other.label(),
                "Host record lookup"
            ),
        }
        metrics::record_lookup(outcome.label(), start);

        outcome
    }

    /// Evaluate the host of a request.
    pub async fn check(&self, parts: &Parts) -> MatchOutcome {
        match host_of(parts) {
            Some(host) => self.evaluate(host).await,
            None => {
                tracing::debug!("Request has no host");
                metrics::record_lookup(MatchOutcome::NoKey.label(), Instant::now());
                MatchOutcome::NoKey
            }
        }
    }

    /// Routing decision for a request, honoring the failure policy.
    pub async fn decide(&self, parts: &Parts) -> Result<bool, MatchError> {
        match self.check(parts).await {
            MatchOutcome::Matched { .. } => Ok(true),
            MatchOutcome::NoKey | MatchOutcome::NotFound { .. } => Ok(false),
            MatchOutcome::LookupFailed { key, error } => match self.policy {
                FailurePolicy::FailOpen => Ok(false),
                FailurePolicy::FailClosed => Err(MatchError::Lookup { key, source: error }),
            },
        }
    }

    /// Plain predicate: true only for a confirmed record. Failures are false.
    pub async fn matches(&self, parts: &Parts) -> bool {
        self.check(parts).await.is_match()
    }
}

/// Hostname of a request without its port.
pub fn host_of(parts: &Parts) -> Option<&str> {
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| parts.uri.host())?;
    let host = strip_port(host.trim());
    (!host.is_empty()).then_some(host)
}

/// Drop a trailing `:port` (possibly empty), leaving bracketed IPv6 literals intact.
pub fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
