//! Shared fakes and helpers for integration tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceExt;

use profview::config::ServerConfig;
use profview::dispatch::index::TraceRange;
use profview::dispatch::{BlockingKind, Granularity, ViewRequest};
use profview::engine::{EngineError, EngineHandler, EngineOptions, ExplorerEngine, HandlerMapArgs};
use profview::resolve::encode_series;
use profview::store::{Label, MemoryStore};
use profview::trace::{TraceError, TraceModel, TraceParser};
use profview::HttpServer;

/// Payload that the fake trace parser rejects.
pub const CORRUPT_TRACE: &[u8] = b"corrupt";

/// Trace model that answers every view with `<view> of <payload>`.
pub struct FakeTraceModel {
    payload: String,
    ranges: Vec<TraceRange>,
}

impl FakeTraceModel {
    fn answer(&self, view: &str) -> Response {
        format!("{} of {}", view, self.payload).into_response()
    }
}

impl TraceModel for FakeTraceModel {
    fn ranges(&self) -> Vec<TraceRange> {
        self.ranges.clone()
    }

    fn blocking_profile(&self, kind: BlockingKind, granularity: Granularity, view: &ViewRequest) -> Response {
        let raw = if view.query_param("raw").is_some() { " raw" } else { "" };
        self.answer(&format!("{:?} {:?}{}", kind, granularity, raw))
    }

    fn user_tasks(&self, _: &ViewRequest) -> Response {
        self.answer("usertasks")
    }

    fn user_task(&self, _: &ViewRequest) -> Response {
        self.answer("usertask")
    }

    fn user_regions(&self, _: &ViewRequest) -> Response {
        self.answer("userregions")
    }

    fn user_region(&self, _: &ViewRequest) -> Response {
        self.answer("userregion")
    }

    fn goroutines(&self, _: &ViewRequest) -> Response {
        self.answer("goroutines")
    }

    fn goroutine(&self, view: &ViewRequest) -> Response {
        let id = view.query_param("id").unwrap_or_default();
        self.answer(&format!("goroutine {}", id))
    }

    fn mmu(&self, _: &ViewRequest) -> Response {
        self.answer("mmu")
    }

    fn mmu_plot(&self, _: &ViewRequest) -> Response {
        self.answer("mmuPlot")
    }

    fn mmu_details(&self, _: &ViewRequest) -> Response {
        self.answer("mmuDetails")
    }

    fn raw_trace(&self, _: &ViewRequest) -> Response {
        self.answer("trace")
    }

    fn json_trace(&self, view: &ViewRequest) -> Response {
        self.answer(&format!("jsontrace {}", view.remainder))
    }
}

/// Parses any payload except [`CORRUPT_TRACE`].
#[derive(Default)]
pub struct FakeTraceParser {
    pub ranges: Vec<TraceRange>,
}

impl TraceParser for FakeTraceParser {
    fn parse(&self, raw: &[u8]) -> Result<Box<dyn TraceModel>, TraceError> {
        if raw == CORRUPT_TRACE {
            return Err(TraceError::Parse("unexpected end of trace".to_string()));
        }
        Ok(Box::new(FakeTraceModel {
            payload: String::from_utf8_lossy(raw).into_owned(),
            ranges: self.ranges.clone(),
        }))
    }
}

/// Engine registering `/` and `/flamegraph`, both echoing the fetched bytes.
pub struct EchoEngine;

impl ExplorerEngine for EchoEngine {
    type Profile = String;

    fn decode_profile(&self, raw: &[u8]) -> Result<Self::Profile, EngineError> {
        String::from_utf8(raw.to_vec()).map_err(|e| EngineError::Decode(e.to_string()))
    }

    fn run(&self, options: EngineOptions<'_, Self::Profile>) -> Result<(), EngineError> {
        let (profile, _) = options
            .fetch
            .fetch(&options.flags.target, Duration::ZERO, Duration::ZERO)?;

        let mut handlers: HashMap<String, EngineHandler> = HashMap::new();
        let top = profile.clone();
        handlers.insert(
            "/".to_string(),
            Box::new(move |_: &ViewRequest| format!("top of {}", top).into_response()),
        );
        handlers.insert(
            "/flamegraph".to_string(),
            Box::new(move |_: &ViewRequest| format!("flamegraph of {}", profile).into_response()),
        );

        let (host, port) = options.flags.http_host_port();
        options.http_server.serve(HandlerMapArgs {
            host,
            port,
            handlers,
        })
    }
}

/// Store with one trace series and one heap series.
pub fn sample_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let trace = vec![Label::new("job", "api"), Label::new("profile_type", "trace")];
    let heap = vec![Label::new("job", "api"), Label::new("profile_type", "heap")];
    let broken = vec![Label::new("job", "broken"), Label::new("profile_type", "trace")];

    store.append(trace.clone(), 1000, b"trace@1000".to_vec()).unwrap();
    store.append(trace, 2000, b"trace@2000".to_vec()).unwrap();
    store.append(heap.clone(), 1000, b"heap@1000".to_vec()).unwrap();
    store.append(heap, 5000, b"heap@5000".to_vec()).unwrap();
    store.append(broken, 1000, CORRUPT_TRACE.to_vec()).unwrap();
    store
}

pub fn test_router() -> Router {
    test_router_with(FakeTraceParser::default())
}

pub fn test_router_with(parser: FakeTraceParser) -> Router {
    HttpServer::new(
        ServerConfig::default(),
        Arc::new(sample_store()),
        Arc::new(parser),
        EchoEngine,
    )
    .unwrap()
    .into_router()
}

/// Path for `selector` at `timestamp` with a view sub-path.
pub fn view_path(selector: &str, timestamp: &str, view: &str) -> String {
    format!("/pprof/{}/{}{}", encode_series(selector), timestamp, view)
}

/// Send a GET through the router and collect status, headers and body.
pub async fn send(router: Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    send_request(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn send_request(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8_lossy(&body).into_owned())
}
