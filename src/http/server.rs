//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the routing handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Ask the host matcher for a decision on every request
//! - Forward to the matched or unmatched upstream
//! - Serve until the shutdown signal fires

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        HeaderName, HeaderValue, Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RouterConfig, UpstreamConfig};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::HostRecordMatcher;

/// Header added to forwarded requests carrying the routing decision.
pub const X_HOST_MATCH: HeaderName = HeaderName::from_static("x-host-match");

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Which upstream a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Matched,
    Unmatched,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Matched => "matched",
            Decision::Unmatched => "unmatched",
        }
    }
}

/// Parsed upstream authorities.
#[derive(Debug, Clone)]
pub struct Upstreams {
    matched: Authority,
    unmatched: Authority,
}

impl Upstreams {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, InvalidUri> {
        Ok(Self {
            matched: Authority::from_str(&config.matched)?,
            unmatched: Authority::from_str(&config.unmatched)?,
        })
    }

    pub fn for_decision(&self, decision: Decision) -> &Authority {
        match decision {
            Decision::Matched => &self.matched,
            Decision::Unmatched => &self.unmatched,
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<HostRecordMatcher>,
    pub upstreams: Arc<Upstreams>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server routing on host record presence.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and matcher.
    pub fn new(config: &RouterConfig, matcher: HostRecordMatcher) -> Result<Self, InvalidUri> {
        let upstreams = Upstreams::from_config(&config.upstreams)?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            matcher: Arc::new(matcher),
            upstreams: Arc::new(upstreams),
            client,
        };

        let router = Self::build_router(config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(route_handler))
            .route("/", any(route_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// A handle to the router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Decide, then forward to the chosen upstream.
async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (mut parts, body) = request.into_parts();

    let request_id = parts
        .headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let decision = match state.matcher.decide(&parts).await {
        Ok(true) => Decision::Matched,
        Ok(false) => Decision::Unmatched,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting request, host lookup failed");
            metrics::record_request("error", 503, start);
            return (StatusCode::SERVICE_UNAVAILABLE, "Host lookup unavailable").into_response();
        }
    };

    let authority = state.upstreams.for_decision(decision);

    // URI rewrite
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
            metrics::record_request(decision.as_str(), 500, start);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid upstream URI").into_response();
        }
    };
    // Upstream hop is always HTTP/1.1
    parts.version = Version::HTTP_11;
    parts
        .headers
        .insert(X_HOST_MATCH, HeaderValue::from_static(decision.as_str()));

    tracing::debug!(
        request_id = %request_id,
        decision = decision.as_str(),
        upstream = %authority,
        path = %parts.uri.path(),
        "Forwarding request"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_request(decision.as_str(), response.status().as_u16(), start);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %authority, error = %e, "Upstream error");
            metrics::record_request(decision.as_str(), 502, start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::routing::IndexExtractor;
    use crate::store::{RecordStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use tower::ServiceExt;

    #[derive(Debug)]
    struct DownStore;

    #[async_trait]
    impl RecordStore for DownStore {
        async fn contains(&self, _: &str, _: &str, _: &str) -> StoreResult<bool> {
            Err(StoreError::Remote("connection refused".into()))
        }
    }

    #[test]
    fn test_upstreams_by_decision() {
        let upstreams = Upstreams::from_config(&UpstreamConfig {
            matched: "10.0.0.1:80".into(),
            unmatched: "10.0.0.2:8080".into(),
        })
        .unwrap();
        assert_eq!(upstreams.for_decision(Decision::Matched).as_str(), "10.0.0.1:80");
        assert_eq!(upstreams.for_decision(Decision::Unmatched).as_str(), "10.0.0.2:8080");
    }

    #[tokio::test]
    async fn test_fail_closed_returns_503() {
        let matcher = HostRecordMatcher::new(
            "tenants",
            "tenant",
            Box::new(IndexExtractor::new(0)),
            Arc::new(DownStore),
        )
        .with_policy(FailurePolicy::FailClosed);
        let server = HttpServer::new(&RouterConfig::default(), matcher).unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("Host", "tenantA.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().contains_key(&X_REQUEST_ID));
    }
}
