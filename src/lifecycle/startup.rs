//! Startup orchestration.
//!
//! # Responsibilities
//! - Install logging and, if enabled, the metrics exporter
//! - Build the store client and the matcher from validated config
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use crate::config::{ObservabilityConfig, RouterConfig};
use crate::observability::{logging, metrics};
use crate::routing::{ExtractorError, HostRecordMatcher};
use crate::store::DynamoStore;

/// Install the tracing subscriber and the metrics recorder.
pub fn init_observability(config: &ObservabilityConfig) {
    logging::init(config);

    if !config.metrics_enabled {
        return;
    }
    match config.metrics_address.parse() {
        Ok(addr) => {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to start metrics exporter");
            }
        }
        Err(_) => tracing::error!(
            metrics_address = %config.metrics_address,
            "Failed to parse metrics address"
        ),
    }
}

/// Build a DynamoDB-backed matcher.
pub async fn build_matcher(config: &RouterConfig) -> Result<HostRecordMatcher, ExtractorError> {
    let store = DynamoStore::from_config(&config.store).await;
    let matcher = HostRecordMatcher::from_config(&config.lookup, Arc::new(store))?;

    tracing::info!(
        table = %config.lookup.table_name,
        key_name = %config.lookup.key_name,
        extractor = ?config.lookup.extractor,
        on_error = ?config.lookup.on_error,
        timeout_ms = config.lookup.timeout_ms,
        "Host matcher ready"
    );
    Ok(matcher)
}
