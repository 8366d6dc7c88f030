//! Key-value store subsystem.
//!
//! # Data Flow
//! ```text
//! StoreConfig (region, credentials, endpoint)
//!     → dynamodb.rs (client built once at startup)
//!     → Arc<dyn RecordStore> injected into the matcher
//!     → contains(table, key_name, key) per request
//! ```
//!
//! # Design Decisions
//! - One point read per call; no retries, no caching
//! - "Absent" and "failed" are distinct results
//! - Backends are substitutable (memory.rs for tests and dry runs)

use async_trait::async_trait;

pub mod dynamodb;
pub mod memory;
pub mod types;

pub use dynamodb::DynamoStore;
pub use memory::MemoryStore;
pub use types::{StoreError, StoreResult};

/// A key-value store that can answer single-item existence checks.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Returns `Ok(true)` if `table` holds an item whose string attribute
    /// `key_name` equals `key`.
    async fn contains(&self, table: &str, key_name: &str, key: &str) -> StoreResult<bool>;
}
