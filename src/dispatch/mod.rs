//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! request path + query
//!     → resolve::path      (series token, timestamp token, remainder)
//!     → resolve::selector  (SnapshotKey + declared profile type)
//!     → router.rs          (TRACE or DEFAULT by profile type)
//!         TRACE   → trace::TraceViewAdapter   → catalog.rs (remainder → sub-view)
//!         DEFAULT → engine::GenericProfileAdapter (engine-owned handler map)
//!     → axum Response
//! ```
//!
//! # Design Decisions
//! - Catalog and index page are built once at startup and shared read-only
//! - Sub-view selection is a map lookup, with `/jsontrace` as the only prefix match
//! - Every failure maps onto one `ErrorKind`, which decides the HTTP status

pub mod catalog;
pub mod error;
pub mod index;
pub mod router;

use url::form_urlencoded;

pub use catalog::{BlockingKind, Granularity, TraceCatalog, TraceView, JSON_TRACE_PREFIX};
pub use error::{DispatchError, ErrorKind};
pub use index::IndexPage;
pub use router::{DispatchRouter, Route};

/// The part of a request that selects a sub-view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRequest {
    /// Path after the series and timestamp segments, always starting with `/`.
    pub remainder: String,
    /// Raw query string, if any.
    pub query: Option<String>,
    /// `/<prefix>/<series>/<timestamp>`, for building links back into the snapshot.
    pub base_path: String,
}

impl ViewRequest {
    /// Look up a form-decoded query parameter by name. The first occurrence wins.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param() {
        let view = ViewRequest {
            remainder: "/goroutine".into(),
            query: Some("id=7&raw".into()),
            base_path: "/pprof/a/1".into(),
        };
        assert_eq!(view.query_param("id").as_deref(), Some("7"));
        assert_eq!(view.query_param("raw").as_deref(), Some(""));
        assert_eq!(view.query_param("missing"), None);
        assert_eq!(ViewRequest::default().query_param("id"), None);
    }

    #[test]
    fn test_query_param_decodes_values() {
        let view = ViewRequest {
            query: Some("id=%37&name=a+b&name=second&path=%2Fx%3Fy".into()),
            ..Default::default()
        };
        assert_eq!(view.query_param("id").as_deref(), Some("7"));
        assert_eq!(view.query_param("name").as_deref(), Some("a b"));
        assert_eq!(view.query_param("path").as_deref(), Some("/x?y"));
    }
}
