//! Host record router.
//!
//! ```text
//!   Client Request ──▶ Host header ──▶ key extractor ──▶ point read ──▶ matched?
//!                                                                     │
//!                              ┌──────────────────────────────────────┴───────┐
//!                              ▼ yes                                          ▼ no / failed (fail open)
//!                       matched upstream                               unmatched upstream
//! ```
//!
//! Commands:
//! - `serve` (default): run the router
//! - `validate`: load and validate the configuration, then exit
//! - `lookup <host>`: evaluate one hostname and print the outcome as JSON

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use host_router::config::{load_config, RouterConfig};
use host_router::http::HttpServer;
use host_router::lifecycle::{signals, startup, Shutdown};
use host_router::routing::matcher::strip_port;
use host_router::routing::{HostRecordMatcher, MatchOutcome};
use host_router::store::{DynamoStore, MemoryStore, RecordStore};

#[derive(Parser)]
#[command(name = "host-router", version)]
#[command(about = "Routes requests by whether their host has a record in DynamoDB", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "host-router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the router
    Serve,
    /// Validate the configuration and exit
    Validate,
    /// Evaluate a single hostname and print the outcome
    Lookup {
        /// Hostname, optionally with a port
        host: String,

        /// Check against an in-memory table holding only these keys
        #[arg(long = "memory-key")]
        memory_keys: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Validate => {
            println!("{}: configuration is valid", cli.config.display());
            Ok(())
        }
        Commands::Lookup { host, memory_keys } => lookup(config, &host, memory_keys).await,
    }
}

async fn serve(config: RouterConfig) -> Result<(), Box<dyn std::error::Error>> {
    startup::init_observability(&config.observability);

    tracing::info!("host-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        matched = %config.upstreams.matched,
        unmatched = %config.upstreams.unmatched,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let matcher = startup::build_matcher(&config).await?;
    let server = HttpServer::new(&config, matcher)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn lookup(
    config: RouterConfig,
    host: &str,
    memory_keys: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = lookup_report(&config, host, &memory_keys).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Evaluate `host` and describe the outcome as JSON. A non-empty
/// `memory_keys` replaces DynamoDB with an in-memory table holding only those keys.
async fn lookup_report(
    config: &RouterConfig,
    host: &str,
    memory_keys: &[String],
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let store: Arc<dyn RecordStore> = if memory_keys.is_empty() {
        Arc::new(DynamoStore::from_config(&config.store).await)
    } else {
        let store = MemoryStore::new();
        for key in memory_keys {
            store.insert(&config.lookup.table_name, &config.lookup.key_name, key);
        }
        Arc::new(store)
    };

    let matcher = HostRecordMatcher::from_config(&config.lookup, store)?;
    let host = strip_port(host);
    let outcome = matcher.evaluate(host).await;

    let error = match &outcome {
        MatchOutcome::LookupFailed { error, .. } => Some(error.to_string()),
        _ => None,
    };
    Ok(serde_json::json!({
        "host": host,
        "table": config.lookup.table_name,
        "key_name": config.lookup.key_name,
        "key": outcome.key(),
        "outcome": outcome.label(),
        "matched": outcome.is_match(),
        "error": error,
    }))
}
