//! Host record router library.
//!
//! Routes each request by asking one question: does the key derived from
//! its Host header have a record in a key-value store?

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;

pub use config::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{HostRecordMatcher, MatchOutcome};
pub use store::RecordStore;
