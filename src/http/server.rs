//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Hand snapshot requests to the dispatch router off the async reactor
//! - Observability (metrics, correlation IDs)

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::dispatch::{DispatchRouter, ErrorKind};
use crate::engine::{ExplorerEngine, GenericProfileAdapter};
use crate::http::request::{request_id_middleware, RequestId, RequestIdExt};
use crate::observability::metrics;
use crate::resolve::SnapshotFetcher;
use crate::store::SnapshotStore;
use crate::trace::TraceParser;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<DispatchRouter>,
}

/// HTTP server for snapshot views.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server over `store`, using `trace_parser` for the
    /// trace profile type and `engine` for every other type.
    ///
    /// Fails only if the index page template does not compile.
    pub fn new<E: ExplorerEngine>(
        config: ServerConfig,
        store: Arc<dyn SnapshotStore>,
        trace_parser: Arc<dyn TraceParser>,
        engine: E,
    ) -> Result<Self, tera::Error> {
        let dispatcher = DispatchRouter::new(
            config.routing.clone(),
            SnapshotFetcher::new(store),
            trace_parser,
            Arc::new(GenericProfileAdapter::new(Arc::new(engine))),
        )?;
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let prefix = &config.routing.prefix;
        Router::new()
            .route(&format!("{prefix}/{{*path}}"), get(snapshot_handler))
            .route("/healthz", get(health_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for serving or driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.routing.prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Resolve a snapshot path and render the requested view.
async fn snapshot_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .request_id()
        .cloned()
        .unwrap_or_else(|| RequestId("unknown".to_string()));

    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    tracing::debug!(request_id = %request_id, path = %path, "Serving snapshot view");

    let dispatcher = state.dispatcher.clone();
    let dispatch_path = path.clone();
    let result =
        tokio::task::spawn_blocking(move || dispatcher.dispatch(&dispatch_path, query.as_deref()))
            .await;

    let response = match result {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            match e.kind() {
                ErrorKind::Downstream => {
                    tracing::error!(request_id = %request_id, path = %path, error = %e, "Dispatch failed")
                }
                kind => {
                    tracing::info!(request_id = %request_id, path = %path, kind = kind.as_str(), error = %e, "Request rejected")
                }
            }
            e.into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    };

    metrics::record_request("snapshot", response.status().as_u16(), start_time);
    response
}

/// Liveness check.
async fn health_handler() -> &'static str {
    "ok"
}
