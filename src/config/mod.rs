//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, pattern compilation)
//!     → RouterConfig (validated, immutable)
//!     → consumed once at startup to build the matcher and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ExtractorConfig;
pub use schema::FailurePolicy;
pub use schema::ListenerConfig;
pub use schema::LookupConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouterConfig;
pub use schema::StoreConfig;
pub use schema::UpstreamConfig;
