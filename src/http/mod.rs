//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → routing (host matcher decides matched / unmatched)
//!     → server.rs (URI rewrite, x-host-match header)
//!     → upstream via hyper-util client
//!     → response streamed back to client
//! ```

pub mod server;

pub use server::{Decision, HttpServer, X_HOST_MATCH, X_REQUEST_ID};
