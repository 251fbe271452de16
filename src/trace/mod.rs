//! Execution-trace subsystem contract.
//!
//! # Data Flow
//! ```text
//! Snapshot bytes
//!     → TraceParser::parse      (external parser, owns the trace format)
//!     → TraceModel              (one renderer per catalog entry)
//!     → adapter.rs              (catalog lookup → renderer → Response)
//! ```
//!
//! # Design Decisions
//! - This crate never interprets trace bytes itself
//! - Renderers produce complete HTTP responses (HTML, SVG, JSON, raw)
//! - The index page is rendered here from the model's ranges

pub mod adapter;

use axum::response::Response;
use thiserror::Error;

use crate::dispatch::index::TraceRange;
use crate::dispatch::{BlockingKind, Granularity, ViewRequest};

pub use adapter::TraceViewAdapter;

/// Errors raised by a trace parser.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("{0}")]
    Parse(String),

    #[error("trace analysis is not available")]
    Unavailable,
}

/// Parses raw trace bytes into a renderable model.
pub trait TraceParser: Send + Sync {
    fn parse(&self, raw: &[u8]) -> Result<Box<dyn TraceModel>, TraceError>;
}

/// A parsed execution trace exposing one renderer per sub-view.
pub trait TraceModel {
    /// Time slices of a large trace, each viewable separately.
    /// Empty when the trace is small enough to view whole.
    fn ranges(&self) -> Vec<TraceRange>;

    /// Goroutine blocking profile. `?raw=1` requests the raw profile artifact.
    fn blocking_profile(
        &self,
        kind: BlockingKind,
        granularity: Granularity,
        view: &ViewRequest,
    ) -> Response;

    fn user_tasks(&self, view: &ViewRequest) -> Response;

    fn user_task(&self, view: &ViewRequest) -> Response;

    fn user_regions(&self, view: &ViewRequest) -> Response;

    fn user_region(&self, view: &ViewRequest) -> Response;

    fn goroutines(&self, view: &ViewRequest) -> Response;

    fn goroutine(&self, view: &ViewRequest) -> Response;

    /// Minimum mutator utilization summary.
    fn mmu(&self, view: &ViewRequest) -> Response;

    fn mmu_plot(&self, view: &ViewRequest) -> Response;

    fn mmu_details(&self, view: &ViewRequest) -> Response;

    /// The raw trace view.
    fn raw_trace(&self, view: &ViewRequest) -> Response;

    /// Trace events in JSON trace-event format.
    fn json_trace(&self, view: &ViewRequest) -> Response;
}

/// Parser used when no trace analysis backend is linked in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTraceParser;

impl TraceParser for UnavailableTraceParser {
    fn parse(&self, _raw: &[u8]) -> Result<Box<dyn TraceModel>, TraceError> {
        Err(TraceError::Unavailable)
    }
}
