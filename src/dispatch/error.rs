//! Dispatch error taxonomy.

use thiserror::Error;

use crate::engine::EngineError;
use crate::resolve::ResolveError;
use crate::trace::TraceError;

/// Coarse classification deciding how a failure is reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Undecodable series token, bad selector syntax, bad timestamp.
    BadRequest,
    /// No matching series, or no sample at or after the timestamp.
    NotFound,
    /// The exploration engine registered no handler for the sub-path.
    UnknownEndpoint,
    /// Store, trace parser, engine or index rendering failed.
    Downstream,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UnknownEndpoint => "unknown_endpoint",
            ErrorKind::Downstream => "downstream",
        }
    }
}

/// Any failure while resolving and dispatching a snapshot request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("parse trace: {0}")]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("render index: {0}")]
    Render(#[from] tera::Error),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Resolve(e) => e.kind(),
            DispatchError::Trace(_) => ErrorKind::Downstream,
            DispatchError::Engine(e) => e.kind(),
            DispatchError::Render(_) => ErrorKind::Downstream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_endpoint_text_is_verbatim() {
        let err = DispatchError::from(EngineError::UnknownEndpoint("/nonexistent".into()));
        assert_eq!(err.kind(), ErrorKind::UnknownEndpoint);
        assert_eq!(err.to_string(), "unknown endpoint /nonexistent");
    }

    #[test]
    fn test_fetch_failure_keeps_resolve_kind() {
        let err = DispatchError::from(EngineError::Fetch(ResolveError::NoSample(10)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_trace_failure_is_downstream() {
        let err = DispatchError::from(TraceError::Parse("truncated".into()));
        assert_eq!(err.kind(), ErrorKind::Downstream);
        assert_eq!(err.to_string(), "parse trace: truncated");
    }
}
