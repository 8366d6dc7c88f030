//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use host_router::config::{ExtractorConfig, RouterConfig};
use host_router::store::MemoryStore;
use host_router::HostRecordMatcher;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock upstream on an ephemeral port.
///
/// Responds 200 with body `{name}|{x-host-match}|{host}` so tests can see
/// where a request landed and what was forwarded.
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                let body = format!(
                    "{}|{}|{}",
                    name,
                    header_value(&head, "x-host-match").unwrap_or("-"),
                    header_value(&head, "host").unwrap_or("-"),
                );
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// An address nothing is listening on.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A valid config pointing at the given upstreams.
pub fn router_config(matched: SocketAddr, unmatched: SocketAddr, extractor: ExtractorConfig) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.lookup.table_name = "tenants".into();
    config.lookup.key_name = "tenant".into();
    config.lookup.extractor = extractor;
    config.upstreams.matched = matched.to_string();
    config.upstreams.unmatched = unmatched.to_string();
    config
}

/// Matcher over an in-memory table holding `keys`.
pub fn memory_matcher(config: &RouterConfig, keys: &[&str]) -> HostRecordMatcher {
    let store = MemoryStore::new();
    for key in keys {
        store.insert(&config.lookup.table_name, &config.lookup.key_name, key);
    }
    HostRecordMatcher::from_config(&config.lookup, Arc::new(store)).unwrap()
}
