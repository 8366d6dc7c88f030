//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ExtractorConfig, FailurePolicy};

    const REGEX_CONFIG: &str = r#"
        [listener]
        bind_address = "127.0.0.1:8080"

        [lookup]
        table_name = "migrated_domains"
        key_name = "domain"
        on_error = "fail_closed"
        timeout_ms = 500

        [lookup.extractor]
        kind = "regex"
        pattern = '[a-z0-9-]+\.[a-z0-9-]+'

        [store]
        region = "eu-west-1"
        access_key = "AKIAEXAMPLE"
        secret_key = "secret"

        [upstreams]
        matched = "10.0.0.1:80"
        unmatched = "10.0.0.2:80"
    "#;

    #[test]
    fn test_parse_regex_config() {
        let config = parse_config(REGEX_CONFIG).unwrap();
        assert_eq!(config.lookup.table_name, "migrated_domains");
        assert_eq!(config.lookup.on_error, FailurePolicy::FailClosed);
        assert_eq!(config.lookup.timeout_ms, 500);
        assert_eq!(
            config.lookup.extractor,
            ExtractorConfig::Regex {
                pattern: r"[a-z0-9-]+\.[a-z0-9-]+".into(),
                strip_pattern: "(?:www)".into(),
            }
        );
        assert_eq!(config.store.region, "eu-west-1");
        // Sections left out fall back to defaults
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_parse_index_config() {
        let config = parse_config(
            r#"
            [lookup]
            table_name = "tenants"
            key_name = "tenant"
            extractor = { kind = "index", index = 1 }
            "#,
        )
        .unwrap();
        assert_eq!(config.lookup.extractor, ExtractorConfig::Index { index: 1 });
        assert_eq!(config.lookup.on_error, FailurePolicy::FailOpen);
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config = parse_config(REGEX_CONFIG).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_unknown_extractor_kind_is_parse_error() {
        let err = parse_config(
            r#"
            [lookup]
            table_name = "t"
            key_name = "k"
            extractor = { kind = "suffix" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = parse_config("[lookup]\ntable_name = \"t\"\n").unwrap_err();
        assert!(err.to_string().contains("lookup.key_name"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = parse_config(include_str!("../../host-router.example.toml")).unwrap();
        assert_eq!(config.lookup.key_name, "domain");
        assert!(config.store.access_key.is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/host-router.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
