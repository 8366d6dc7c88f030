//! Lookup key extraction from hostnames.
//!
//! # Responsibilities
//! - Derive the lookup key from a hostname (port already removed)
//! - Report "no key" instead of failing when a host cannot be keyed
//!
//! # Design Decisions
//! - Patterns are compiled once, when the extractor is built
//! - Extraction never panics; short hosts and empty labels yield `None`
//! - Case is preserved: keys are compared verbatim by the store

use regex::Regex;
use thiserror::Error;

use crate::config::ExtractorConfig;

/// Derives a lookup key from a hostname.
pub trait KeyExtractor: Send + Sync + std::fmt::Debug {
    /// Returns the key, or `None` if this host cannot produce one.
    fn extract(&self, host: &str) -> Option<String>;
}

/// Error raised when an extractor cannot be built.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid key pattern: {0}")]
    Pattern(#[source] regex::Error),

    #[error("invalid strip pattern: {0}")]
    StripPattern(#[source] regex::Error),
}

/// Build the extractor described by configuration.
pub fn build_extractor(config: &ExtractorConfig) -> Result<Box<dyn KeyExtractor>, ExtractorError> {
    match config {
        ExtractorConfig::Regex {
            pattern,
            strip_pattern,
        } => {
            let extractor = if strip_pattern.is_empty() {
                RegexExtractor::without_strip(pattern)?
            } else {
                RegexExtractor::new(pattern, strip_pattern)?
            };
            Ok(Box::new(extractor))
        }
        ExtractorConfig::Index { index } => Ok(Box::new(IndexExtractor::new(*index))),
    }
}

/// Takes the leftmost match of a pattern.
///
/// When the hostname also matches the strip pattern (by default any
/// occurrence of `www`), the match is split on `.` and its second label is
/// used instead, so `www.shop` yields `shop`.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    pattern: Regex,
    strip: Option<Regex>,
}

impl RegexExtractor {
    pub fn new(pattern: &str, strip_pattern: &str) -> Result<Self, ExtractorError> {
        Ok(Self {
            pattern: Regex::new(pattern).map_err(ExtractorError::Pattern)?,
            strip: Some(Regex::new(strip_pattern).map_err(ExtractorError::StripPattern)?),
        })
    }

    /// An extractor that always uses the full match.
    pub fn without_strip(pattern: &str) -> Result<Self, ExtractorError> {
        Ok(Self {
            pattern: Regex::new(pattern).map_err(ExtractorError::Pattern)?,
            strip: None,
        })
    }
}

impl KeyExtractor for RegexExtractor {
    fn extract(&self, host: &str) -> Option<String> {
        let matched = self.pattern.find(host)?.as_str();
        if matched.is_empty() {
            return None;
        }

        let strip = self.strip.as_ref().is_some_and(|re| re.is_match(host));
        if !strip {
            return Some(matched.to_string());
        }

        // Single-label match: nothing left once the prefix is dropped
        match matched.split('.').nth(1) {
            Some(label) if !label.is_empty() => Some(label.to_string()),
            _ => None,
        }
    }
}

/// Takes the label at a fixed position (0 = leftmost).
#[derive(Debug, Clone, Copy)]
pub struct IndexExtractor {
    index: usize,
}

impl IndexExtractor {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl KeyExtractor for IndexExtractor {
    fn extract(&self, host: &str) -> Option<String> {
        host.split('.')
            .nth(self.index)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLD_PATTERN: &str = r"[a-z0-9-]+\.[a-z0-9-]+";

    fn regex_extractor() -> RegexExtractor {
        RegexExtractor::new(SLD_PATTERN, "(?:www)").unwrap()
    }

    #[test]
    fn test_regex_full_match_without_www() {
        let extractor = regex_extractor();
        assert_eq!(extractor.extract("shop.example.com"), Some("shop.example".into()));
    }

    #[test]
    fn test_regex_strips_www_from_match() {
        let extractor = regex_extractor();
        assert_eq!(extractor.extract("www.shop.example.com"), Some("shop".into()));
    }

    #[test]
    fn test_regex_strip_uses_match_not_host() {
        // Match is "example.com"; the host's second label would be "example"
        let extractor = RegexExtractor::new(r"[a-z]+\.com", "(?:www)").unwrap();
        assert_eq!(extractor.extract("www.example.com"), Some("com".into()));
    }

    #[test]
    fn test_regex_no_match_yields_none() {
        let extractor = regex_extractor();
        assert_eq!(extractor.extract("localhost"), None);
        assert_eq!(extractor.extract(""), None);
    }

    #[test]
    fn test_regex_single_label_www_match_yields_none() {
        let extractor = RegexExtractor::new(r"[a-z]+", "(?:www)").unwrap();
        assert_eq!(extractor.extract("www.shop.example.com"), None);
    }

    #[test]
    fn test_regex_empty_match_yields_none() {
        let extractor = RegexExtractor::new(r"[0-9]*", "(?:www)").unwrap();
        assert_eq!(extractor.extract("shop.example.com"), None);
    }

    #[test]
    fn test_regex_without_strip_keeps_www() {
        let extractor = RegexExtractor::without_strip(SLD_PATTERN).unwrap();
        assert_eq!(extractor.extract("www.shop.example.com"), Some("www.shop".into()));
    }

    #[test]
    fn test_index_extractor() {
        let first = IndexExtractor::new(0);
        assert_eq!(first.extract("tenantA.example.com"), Some("tenantA".into()));

        let third = IndexExtractor::new(2);
        assert_eq!(third.extract("tenantA.example.com"), Some("com".into()));
    }

    #[test]
    fn test_index_out_of_range_yields_none() {
        let extractor = IndexExtractor::new(3);
        assert_eq!(extractor.extract("tenantA.example.com"), None);
        assert_eq!(IndexExtractor::new(1).extract("localhost"), None);
    }

    #[test]
    fn test_index_empty_label_yields_none() {
        let extractor = IndexExtractor::new(1);
        assert_eq!(extractor.extract("a..b"), None);
        assert_eq!(IndexExtractor::new(0).extract(""), None);
    }

    #[test]
    fn test_build_from_config() {
        let extractor = build_extractor(&ExtractorConfig::Regex {
            pattern: SLD_PATTERN.into(),
            strip_pattern: String::new(),
        })
        .unwrap();
        assert_eq!(extractor.extract("www.shop.example.com"), Some("www.shop".into()));

        let extractor = build_extractor(&ExtractorConfig::Index { index: 0 }).unwrap();
        assert_eq!(extractor.extract("tenantA.example.com"), Some("tenantA".into()));
    }

    #[test]
    fn test_build_rejects_bad_pattern() {
        let err = build_extractor(&ExtractorConfig::Regex {
            pattern: "(".into(),
            strip_pattern: "(?:www)".into(),
        })
        .unwrap_err();
        assert!(matches!(err, ExtractorError::Pattern(_)));
    }
}
