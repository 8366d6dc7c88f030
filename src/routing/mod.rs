//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host header)
//!     → matcher.rs (host_of: strip port)
//!     → extractor.rs (hostname → lookup key, or no key)
//!     → store (point read under deadline)
//!     → Return: MatchOutcome, collapsed to bool by FailurePolicy
//! ```
//!
//! # Design Decisions
//! - Extractor and store are built at startup, immutable at runtime
//! - Patterns compiled once, never per request
//! - A host that yields no key never reaches the store
//! - No caching: every decision reflects the store at request time

pub mod extractor;
pub mod matcher;

pub use extractor::{build_extractor, ExtractorError, IndexExtractor, KeyExtractor, RegexExtractor};
pub use matcher::{host_of, HostRecordMatcher, MatchError, MatchOutcome};
