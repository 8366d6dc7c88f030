//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the host router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// How the lookup key is derived and checked.
    pub lookup: LookupConfig,

    /// Key-value store connection settings.
    pub store: StoreConfig,

    /// Where matched and unmatched requests are forwarded.
    pub upstreams: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Lookup configuration: which table, which key attribute, and how the
/// key value is extracted from the Host header.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Table holding one row per known host key.
    pub table_name: String,

    /// Name of the (string) partition key attribute.
    pub key_name: String,

    /// Key extraction strategy.
    pub extractor: ExtractorConfig,

    /// What a failed lookup means for the routing decision.
    pub on_error: FailurePolicy,

    /// Upper bound for a single point read, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            key_name: String::new(),
            extractor: ExtractorConfig::default(),
            on_error: FailurePolicy::default(),
            timeout_ms: 2000,
        }
    }
}

/// Strategy for deriving a lookup key from a hostname.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractorConfig {
    /// Leftmost regex match, with the second label taken instead when the
    /// hostname matches `strip_pattern`. An empty `strip_pattern` disables
    /// the stripping rule.
    Regex {
        pattern: String,
        #[serde(default = "default_strip_pattern")]
        strip_pattern: String,
    },

    /// Fixed position in the dot-separated host labels.
    Index { index: usize },
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig::Index { index: 0 }
    }
}

pub fn default_strip_pattern() -> String {
    "(?:www)".to_string()
}

/// Routing behavior when the store cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Treat the request as not matching.
    #[default]
    FailOpen,
    /// Surface the failure to the caller.
    FailClosed,
}

/// Key-value store connection settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// AWS region (e.g., "eu-west-1").
    pub region: String,

    /// Static access key. Leave both keys unset to use the default
    /// credential provider chain.
    pub access_key: Option<String>,

    /// Static secret key.
    pub secret_key: Option<String>,

    /// Endpoint override, e.g. a local DynamoDB at "http://localhost:8000".
    pub endpoint_url: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            access_key: None,
            secret_key: None,
            endpoint_url: None,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Upstream addresses for the two routing outcomes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend for hosts that have a record (e.g., "127.0.0.1:3000").
    pub matched: String,

    /// Backend for everything else.
    pub unmatched: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            matched: "127.0.0.1:3000".to_string(),
            unmatched: "127.0.0.1:3001".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
