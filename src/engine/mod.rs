//! Interactive profile exploration engine contract.
//!
//! # Data Flow
//! ```text
//! GenericProfileAdapter
//!     → ExplorerEngine::run(EngineOptions {
//!           flags        fixed: no symbolization, placeholder bind address, empty target
//!           ui           DiagnosticsSink, logs only
//!           fetch        ProfileFetcher, store lookup + engine-native decode
//!           http_server  HandlerMapDispatcher, serves the current request
//!       })
//!     engine: fetch(..) once → builds handler map → http_server.serve(args) once
//! ```
//!
//! # Design Decisions
//! - The engine owns its handler registration; this crate only intercepts it
//! - No listener is ever bound for the engine's placeholder address
//! - Each shim is a named trait so it can be replaced by a fake in tests

pub mod adapter;
pub mod raw;

use std::collections::HashMap;
use std::time::Duration;

use axum::response::Response;
use thiserror::Error;

use crate::dispatch::{ErrorKind, ViewRequest};
use crate::resolve::ResolveError;

pub use adapter::{GenericProfileAdapter, GenericView, LogDiagnostics, RequestDispatcher, StoreProfileFetcher};
pub use raw::RawEngine;

/// Errors crossing the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No handler registered for the requested sub-path.
    #[error("unknown endpoint {0}")]
    UnknownEndpoint(String),

    /// The injected fetch function failed.
    #[error("get profile: {0}")]
    Fetch(#[source] ResolveError),

    /// Snapshot bytes are not a valid profile for this engine.
    #[error("decode profile: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::UnknownEndpoint(_) => ErrorKind::UnknownEndpoint,
            EngineError::Fetch(e) => e.kind(),
            EngineError::Decode(_) | EngineError::Other(_) => ErrorKind::Downstream,
        }
    }
}

/// Command-line style options handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFlags {
    pub symbolize: String,
    /// Address the engine believes it serves on. Never bound.
    pub http: String,
    /// Positional profile source. Empty because fetching is injected.
    pub target: String,
}

impl EngineFlags {
    /// Symbolization disabled, placeholder bind address, empty target.
    pub fn fixed() -> Self {
        Self {
            symbolize: "none".to_string(),
            http: "localhost:0".to_string(),
            target: String::new(),
        }
    }

    /// Flags in argument-vector form.
    pub fn args(&self) -> Vec<String> {
        vec![
            "--symbolize".to_string(),
            self.symbolize.clone(),
            "--http".to_string(),
            self.http.clone(),
            self.target.clone(),
        ]
    }

    /// Split the `--http` value into host and port.
    pub fn http_host_port(&self) -> (String, u16) {
        match self.http.rsplit_once(':') {
            Some((host, port)) => (host.to_string(), port.parse().unwrap_or(0)),
            None => (self.http.clone(), 0),
        }
    }
}

impl Default for EngineFlags {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Receives the engine's user-facing output.
pub trait DiagnosticsSink {
    fn print(&self, message: &str);

    fn print_err(&self, message: &str);
}

/// Supplies the engine with a profile.
pub trait ProfileFetcher<P> {
    /// Returns the profile and the source name it was fetched from.
    fn fetch(&self, source: &str, duration: Duration, timeout: Duration) -> Result<(P, String), EngineError>;
}

/// A handler registered by the engine for one sub-path.
pub type EngineHandler = Box<dyn Fn(&ViewRequest) -> Response + Send + Sync>;

/// What the engine hands to its HTTP-server hook.
pub struct HandlerMapArgs {
    pub host: String,
    pub port: u16,
    pub handlers: HashMap<String, EngineHandler>,
}

/// Takes over serving once the engine has built its handler map.
pub trait HandlerMapDispatcher {
    fn serve(&mut self, args: HandlerMapArgs) -> Result<(), EngineError>;
}

/// Extension points passed to one engine run.
pub struct EngineOptions<'a, P> {
    pub flags: &'a EngineFlags,
    pub ui: &'a dyn DiagnosticsSink,
    pub fetch: &'a dyn ProfileFetcher<P>,
    pub http_server: &'a mut dyn HandlerMapDispatcher,
}

/// A pull-based, self-hosting profile explorer.
pub trait ExplorerEngine: Send + Sync + 'static {
    /// Engine-native profile representation.
    type Profile;

    fn decode_profile(&self, raw: &[u8]) -> Result<Self::Profile, EngineError>;

    /// Fetch through `options.fetch`, build handlers, and call
    /// `options.http_server` exactly once.
    fn run(&self, options: EngineOptions<'_, Self::Profile>) -> Result<(), EngineError>;
}
