//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create the Axum Router with the gateway, mock and admin surfaces
//! - Wire up middleware (request ID, tracing, server-level timeout)
//! - Classify requests by path prefix and drive the matching pipeline
//! - Convert the failure taxonomy into JSON responses
//!
//! # Design Decisions
//! - Handlers take the whole `Request<Body>` so the raw path and query reach
//!   the router untouched
//! - The clock starts at handler entry, before route lookup, so recorded
//!   durations cover the full request
//! - Bodies are buffered for POST/PUT only, bounded by the configured limit

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::audit::{AuditSink, ExchangeLogger};
use crate::config::AppConfig;
use crate::gateway::{GatewayRouter, ProxyDispatcher};
use crate::http::error::{gateway_failure, json_error};
use crate::lifecycle::Shutdown;
use crate::mock::{synth, MockError, MockMatcher};
use crate::observability::metrics;
use crate::store::{ConfigStore, MockRule};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<ConfigStore>,
    pub sink: Arc<dyn AuditSink>,
    pub router: Arc<GatewayRouter>,
    pub dispatcher: Arc<ProxyDispatcher>,
    pub matcher: Arc<MockMatcher>,
    pub shutdown: Arc<Shutdown>,
}

/// The HTTP server.
pub struct HttpServer {
    router: Router,
    shutdown: Arc<Shutdown>,
}

impl HttpServer {
    /// Create a new server around a seeded store and an audit sink.
    pub fn new(
        config: AppConfig,
        store: Arc<ConfigStore>,
        sink: Arc<dyn AuditSink>,
        shutdown: Arc<Shutdown>,
    ) -> Self {
        let dispatcher = Arc::new(ProxyDispatcher::new(sink.clone()));
        let state = AppState {
            router: Arc::new(GatewayRouter::new(store.clone())),
            matcher: Arc::new(MockMatcher::new(store.clone())),
            dispatcher,
            store,
            sink,
            shutdown: shutdown.clone(),
            config: Arc::new(config),
        };

        Self {
            router: Self::build_router(state),
            shutdown,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        // axum's `get` also answers HEAD, which the gateway accepts.
        let gateway = get(gateway_handler)
            .post(gateway_handler)
            .put(gateway_handler)
            .delete(gateway_handler)
            .options(gateway_handler);
        let mock = get(mock_handler)
            .post(mock_handler)
            .put(mock_handler)
            .delete(mock_handler);
        let mock2 = get(mock2_handler)
            .post(mock2_handler)
            .put(mock2_handler)
            .delete(mock2_handler);

        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);
        let admin_enabled = state.config.admin.enabled;

        let mut app = Router::new()
            .route("/gateway/{*path}", gateway)
            .route("/mock/{*path}", mock)
            .route("/mock2/{*path}", mock2)
            .with_state(state.clone());

        if admin_enabled {
            app = app.merge(admin::admin_router(state));
        }

        app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(request_timeout)),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.wait() => {}
                    _ = shutdown_signal() => shutdown.trigger(),
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Gateway handler: route lookup, URL rewrite, dispatch, audit.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let captured = uri.path().strip_prefix("/gateway/").unwrap_or_default();
    let query = uri.query();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        "Gateway request"
    );

    let matched = match state.router.resolve(captured) {
        Ok(matched) => matched,
        Err(not_found) => {
            tracing::warn!(pattern = %not_found.pattern, "No gateway route matched");
            metrics::record_request(method.as_str(), 404, "gateway", started);
            return json_error(StatusCode::NOT_FOUND, not_found.to_string());
        }
    };
    let target_url = GatewayRouter::target_url(&matched.route, &matched.remainder, query);

    let (parts, body) = request.into_parts();
    let body_bytes = if matches!(method, Method::POST | Method::PUT) {
        match axum::body::to_bytes(body, state.config.limits.max_body_bytes).await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                // A request that dies at intake still gets its one record.
                let message = format!("failed to buffer request body: {error}");
                let mut log = ExchangeLogger::begin(
                    state.sink.clone(),
                    matched.route.id,
                    method.as_str(),
                    None,
                    started,
                );
                log.set_request_url(&target_url);
                log.failure(&message);
                metrics::record_request(method.as_str(), 500, "gateway", started);
                return gateway_failure(&message);
            }
        }
    } else {
        None
    };

    let response = state
        .dispatcher
        .dispatch(
            &matched.route,
            target_url,
            method.clone(),
            &parts.headers,
            body_bytes,
            started,
        )
        .await;

    metrics::record_request(method.as_str(), response.status().as_u16(), "gateway", started);
    response
}

/// Body-matching mock handler (/mock).
async fn mock_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let pattern = request
        .uri()
        .path()
        .strip_prefix("/mock/")
        .unwrap_or_default()
        .to_string();

    let raw_body = if matches!(method, Method::POST | Method::PUT) {
        let body = request.into_body();
        match axum::body::to_bytes(body, state.config.limits.max_body_bytes).await {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(error) => {
                metrics::record_request(method.as_str(), 413, "mock", started);
                return json_error(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("failed to buffer request body: {error}"),
                );
            }
        }
    } else {
        None
    };

    let outcome = state
        .matcher
        .resolve(method.as_str(), &pattern, raw_body.as_deref());
    mock_response(&state, outcome, &method, started, "mock").await
}

/// Body-ignoring mock handler (/mock2).
async fn mock2_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let pattern = request
        .uri()
        .path()
        .strip_prefix("/mock2/")
        .unwrap_or_default()
        .to_string();

    let outcome = state.matcher.resolve_basic(method.as_str(), &pattern);
    mock_response(&state, outcome, &method, started, "mock2").await
}

/// Shared tail of both mock handlers: synthesize or translate the failure.
async fn mock_response(
    state: &AppState,
    outcome: Result<MockRule, MockError>,
    method: &Method,
    started: Instant,
    mode: &'static str,
) -> Response {
    match outcome {
        Ok(rule) => match synth::synthesize(&rule, &state.shutdown).await {
            Ok(response) => {
                metrics::record_request(method.as_str(), response.status().as_u16(), mode, started);
                response
            }
            Err(error) => {
                tracing::error!(%error, "Mock synthesis failed");
                metrics::record_request(method.as_str(), 500, mode, started);
                json_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        },
        Err(error) => {
            let status = match &error {
                MockError::NotFound { .. } => {
                    tracing::debug!(%error, "No mock rule matched");
                    StatusCode::NOT_FOUND
                }
                _ => {
                    tracing::error!(%error, "Mock resolution failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            metrics::record_request(method.as_str(), status.as_u16(), mode, started);
            json_error(status, error.to_string())
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
