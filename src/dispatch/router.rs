//! Dispatch router.
//!
//! # States
//! - TRACE: declared profile type equals the configured trace type
//! - DEFAULT: anything else, including no declared profile type
//!
//! # Design Decisions
//! - The snapshot is fetched at most once per request
//! - The selector is never modified after decoding
//! - The whole pipeline is synchronous; callers run it off the async reactor

use std::sync::Arc;

use axum::response::Response;

use crate::config::RoutingConfig;
use crate::dispatch::{DispatchError, TraceCatalog, ViewRequest};
use crate::engine::GenericView;
use crate::resolve::{resolve_path, SnapshotFetcher, SnapshotKey};
use crate::trace::{TraceParser, TraceViewAdapter};

/// Top-level dispatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Trace,
    Generic,
}

impl Route {
    /// Choose the state for a declared profile type.
    pub fn for_profile_type(profile_type: &str, trace_profile_type: &str) -> Self {
        if profile_type == trace_profile_type {
            Route::Trace
        } else {
            Route::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Trace => "trace",
            Route::Generic => "generic",
        }
    }
}

/// Resolves snapshot requests and hands them to the trace or generic adapter.
pub struct DispatchRouter {
    routing: RoutingConfig,
    snapshots: SnapshotFetcher,
    trace: TraceViewAdapter,
    generic: Arc<dyn GenericView>,
}

impl DispatchRouter {
    pub fn new(
        routing: RoutingConfig,
        snapshots: SnapshotFetcher,
        trace_parser: Arc<dyn TraceParser>,
        generic: Arc<dyn GenericView>,
    ) -> Result<Self, tera::Error> {
        let catalog = Arc::new(TraceCatalog::new());
        Ok(Self {
            routing,
            snapshots,
            trace: TraceViewAdapter::new(trace_parser, catalog)?,
            generic,
        })
    }

    /// Resolve `path` and render the requested view.
    pub fn dispatch(&self, path: &str, query: Option<&str>) -> Result<Response, DispatchError> {
        let resolved = resolve_path(&self.routing.prefix, path);
        tracing::debug!(
            series = %resolved.series,
            timestamp = %resolved.timestamp,
            remainder = %resolved.remainder,
            "Parsed path"
        );

        let key = SnapshotKey::decode(&resolved, &self.routing.profile_type_label)?;
        let view = ViewRequest {
            base_path: format!(
                "{}/{}/{}",
                self.routing.prefix, resolved.series, resolved.timestamp
            ),
            remainder: resolved.remainder,
            query: query.map(str::to_string),
        };

        let route = Route::for_profile_type(
            key.selector.profile_type(),
            &self.routing.trace_profile_type,
        );
        tracing::debug!(
            route = route.as_str(),
            selector = %key.selector,
            timestamp = key.timestamp,
            "Dispatching snapshot"
        );

        match route {
            Route::Trace => {
                let snapshot = self.snapshots.fetch(&key)?;
                self.trace.serve(&snapshot, &view)
            }
            Route::Generic => self.generic.serve(&self.snapshots, &key, &view),
        }
    }
}
