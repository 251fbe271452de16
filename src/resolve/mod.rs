//! Snapshot resolution subsystem.
//!
//! # Data Flow
//! ```text
//! /<prefix>/<seriesToken>/<timestampToken>[/<remainder...>]
//!     → path.rs     (split into series token, timestamp token, remainder)
//!     → selector.rs (base64url → selector text → equality matchers + profile type)
//!     → SnapshotKey (selector, timestamp)
//!     → fetcher.rs  (query full range, first matching series, seek >= timestamp)
//!     → Snapshot    (raw bytes, owned by the request)
//! ```
//!
//! # Design Decisions
//! - A `SnapshotKey` only exists once both tokens decoded successfully
//! - Selectors are immutable after decoding
//! - Every lookup performs a fresh query and seek; nothing is cached

pub mod fetcher;
pub mod path;
pub mod selector;

use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

use crate::dispatch::ErrorKind;
use crate::store::StoreError;

pub use fetcher::SnapshotFetcher;
pub use path::{resolve_path, ResolvedPath};
pub use selector::{decode_series, encode_series, parse_selector};

/// Matching semantics of a label matcher. Only equality is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Equal,
}

/// A single `name="value"` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatcher {
    pub name: String,
    pub value: String,
    pub kind: MatchKind,
}

impl LabelMatcher {
    pub fn equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: MatchKind::Equal,
        }
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.name, self.value)
    }
}

/// Ordered set of matchers identifying one profile series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSelector {
    matchers: Vec<LabelMatcher>,
    profile_type: String,
}

impl SeriesSelector {
    /// Build a selector, capturing the value of `profile_type_label` if present.
    pub fn new(matchers: Vec<LabelMatcher>, profile_type_label: &str) -> Self {
        let mut profile_type = String::new();
        for m in &matchers {
            if m.name == profile_type_label {
                profile_type = m.value.clone();
            }
        }
        Self {
            matchers,
            profile_type,
        }
    }

    pub fn matchers(&self) -> &[LabelMatcher] {
        &self.matchers
    }

    /// Declared profile type; empty when the selector carries none.
    pub fn profile_type(&self) -> &str {
        &self.profile_type
    }
}

impl fmt::Display for SeriesSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, m) in self.matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", m)?;
        }
        f.write_str("}")
    }
}

/// Identifies the exact recorded snapshot to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotKey {
    pub selector: SeriesSelector,
    pub timestamp: i64,
}

impl SnapshotKey {
    /// Decode both path tokens into a key.
    pub fn decode(resolved: &ResolvedPath, profile_type_label: &str) -> Result<Self, ResolveError> {
        if resolved.is_empty() {
            return Err(ResolveError::UnresolvedPath);
        }
        let selector = decode_series(&resolved.series, profile_type_label)?;
        let timestamp = parse_timestamp(&resolved.timestamp)?;
        Ok(Self {
            selector,
            timestamp,
        })
    }
}

/// One recorded payload, owned for the lifetime of a request.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub profile_type: String,
    pub timestamp: i64,
    pub payload: Vec<u8>,
}

/// Parse a decimal timestamp token.
pub fn parse_timestamp(token: &str) -> Result<i64, ResolveError> {
    token
        .parse::<i64>()
        .map_err(|source| ResolveError::Timestamp {
            token: token.to_string(),
            source,
        })
}

/// Failures while turning a request path into a snapshot.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Fewer than two path segments after the prefix.
    #[error("could not resolve series and timestamp from path")]
    UnresolvedPath,

    #[error("could not decode series name: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("could not decode series name: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to parse series labels {selector} with error {reason}")]
    Selector { selector: String, reason: String },

    #[error("bad timestamp {token:?}: {source}")]
    Timestamp {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("no series matches selector {0}")]
    NoSeries(String),

    #[error("no sample at or after timestamp {0}")]
    NoSample(i64),

    #[error("querier: {0}")]
    Store(#[from] StoreError),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::UnresolvedPath
            | ResolveError::Encoding(_)
            | ResolveError::Utf8(_)
            | ResolveError::Selector { .. }
            | ResolveError::Timestamp { .. } => ErrorKind::BadRequest,
            ResolveError::NoSeries(_) | ResolveError::NoSample(_) => ErrorKind::NotFound,
            ResolveError::Store(_) => ErrorKind::Downstream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_captures_profile_type() {
        let selector = SeriesSelector::new(
            vec![
                LabelMatcher::equal("job", "api"),
                LabelMatcher::equal("profile_type", "trace"),
            ],
            "profile_type",
        );
        assert_eq!(selector.profile_type(), "trace");
        assert_eq!(selector.to_string(), r#"{job="api",profile_type="trace"}"#);

        let generic = SeriesSelector::new(vec![LabelMatcher::equal("job", "api")], "profile_type");
        assert_eq!(generic.profile_type(), "");
    }

    #[test]
    fn test_decode_key() {
        let token = encode_series(r#"{profile_type="heap"}"#);
        let resolved = ResolvedPath {
            series: token,
            timestamp: "1700000000000".to_string(),
            remainder: "/".to_string(),
        };
        let key = SnapshotKey::decode(&resolved, "profile_type").unwrap();
        assert_eq!(key.timestamp, 1_700_000_000_000);
        assert_eq!(key.selector.profile_type(), "heap");
    }

    #[test]
    fn test_decode_key_bad_timestamp() {
        let resolved = ResolvedPath {
            series: encode_series(r#"{profile_type="heap"}"#),
            timestamp: "yesterday".to_string(),
            remainder: "/".to_string(),
        };
        let err = SnapshotKey::decode(&resolved, "profile_type").unwrap_err();
        assert!(matches!(err, ResolveError::Timestamp { .. }));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_decode_key_unresolved() {
        let err = SnapshotKey::decode(&ResolvedPath::default(), "profile_type").unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedPath));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ResolveError::NoSample(5).kind(), ErrorKind::NotFound);
        assert_eq!(ResolveError::NoSeries("{}".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            ResolveError::Store(StoreError::InvalidRange { min: 1, max: 0 }).kind(),
            ErrorKind::Downstream
        );
    }
}
