//! Generic Profile Adapter.
//!
//! Runs the exploration engine for a single request. The engine pulls its
//! profile through [`StoreProfileFetcher`], reports through
//! [`LogDiagnostics`], and hands its handler map to [`RequestDispatcher`],
//! which serves the current request from it instead of binding a listener.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use axum::response::Response;

use crate::dispatch::{DispatchError, ViewRequest};
use crate::engine::{
    DiagnosticsSink, EngineError, EngineFlags, EngineOptions, ExplorerEngine, HandlerMapArgs,
    HandlerMapDispatcher, ProfileFetcher,
};
use crate::resolve::{SnapshotFetcher, SnapshotKey};

/// Object-safe entry point used by the dispatch router.
pub trait GenericView: Send + Sync {
    fn serve(
        &self,
        snapshots: &SnapshotFetcher,
        key: &SnapshotKey,
        view: &ViewRequest,
    ) -> Result<Response, DispatchError>;
}

/// Bridges snapshot requests into an [`ExplorerEngine`].
pub struct GenericProfileAdapter<E> {
    engine: Arc<E>,
    flags: EngineFlags,
}

impl<E: ExplorerEngine> GenericProfileAdapter<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            flags: EngineFlags::fixed(),
        }
    }
}

impl<E: ExplorerEngine> GenericView for GenericProfileAdapter<E> {
    fn serve(
        &self,
        snapshots: &SnapshotFetcher,
        key: &SnapshotKey,
        view: &ViewRequest,
    ) -> Result<Response, DispatchError> {
        let fetch = StoreProfileFetcher::new(self.engine.as_ref(), snapshots, key);
        let mut server = RequestDispatcher::new(view);

        self.engine.run(EngineOptions {
            flags: &self.flags,
            ui: &LogDiagnostics,
            fetch: &fetch,
            http_server: &mut server,
        })?;

        server.into_response().ok_or_else(|| {
            DispatchError::Engine(EngineError::Other(
                "engine returned without serving the request".to_string(),
            ))
        })
    }
}

/// Diagnostics sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn print(&self, message: &str) {
        tracing::debug!(diagnostic = message, "Engine output");
    }

    fn print_err(&self, message: &str) {
        tracing::warn!(diagnostic = message, "Engine error output");
    }
}

/// Fetch shim: ignores the engine's source and durations and looks up the
/// snapshot captured at dispatch time.
pub struct StoreProfileFetcher<'a, E> {
    engine: &'a E,
    snapshots: &'a SnapshotFetcher,
    key: &'a SnapshotKey,
    fetched: Cell<bool>,
}

impl<'a, E: ExplorerEngine> StoreProfileFetcher<'a, E> {
    pub fn new(engine: &'a E, snapshots: &'a SnapshotFetcher, key: &'a SnapshotKey) -> Self {
        Self {
            engine,
            snapshots,
            key,
            fetched: Cell::new(false),
        }
    }
}

impl<E: ExplorerEngine> ProfileFetcher<E::Profile> for StoreProfileFetcher<'_, E> {
    fn fetch(
        &self,
        _source: &str,
        _duration: Duration,
        _timeout: Duration,
    ) -> Result<(E::Profile, String), EngineError> {
        if self.fetched.replace(true) {
            return Err(EngineError::Other(
                "profile already fetched for this request".to_string(),
            ));
        }

        let snapshot = self.snapshots.fetch(self.key).map_err(|e| {
            tracing::error!(selector = %self.key.selector, error = %e, "get profile");
            EngineError::Fetch(e)
        })?;
        let profile = self.engine.decode_profile(&snapshot.payload)?;
        Ok((profile, String::new()))
    }
}

/// HTTP-server shim: dispatches the current request into the engine's
/// handler map by its remainder.
pub struct RequestDispatcher<'a> {
    view: &'a ViewRequest,
    response: Option<Response>,
}

impl<'a> RequestDispatcher<'a> {
    pub fn new(view: &'a ViewRequest) -> Self {
        Self {
            view,
            response: None,
        }
    }

    /// The response produced by the engine handler, if one ran.
    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

impl HandlerMapDispatcher for RequestDispatcher<'_> {
    fn serve(&mut self, args: HandlerMapArgs) -> Result<(), EngineError> {
        let handler = args
            .handlers
            .get(&self.view.remainder)
            .ok_or_else(|| EngineError::UnknownEndpoint(self.view.remainder.clone()))?;
        self.response = Some(handler(self.view));
        Ok(())
    }
}
