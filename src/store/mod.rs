//! Snapshot store contract.
//!
//! # Data Flow
//! ```text
//! SnapshotStore::querier(min, max)
//!     → Querier::select(matchers)      (series whose labels satisfy every matcher)
//!     → Series::iterator()             (timestamp-ordered samples)
//!     → SampleIterator::seek(ts)       (forward to first sample >= ts)
//!     → SampleIterator::at()           (timestamp, raw bytes)
//! ```
//!
//! # Design Decisions
//! - The dispatch layer only ever reads through these traits
//! - Implementations must tolerate concurrent readers (`Send + Sync` store)
//! - `memory.rs` provides an in-process implementation backed by a manifest

pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

use crate::resolve::LabelMatcher;

pub use memory::MemoryStore;

/// A single `name=value` label on a series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Errors raised by a snapshot store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query bounds were rejected by the store.
    #[error("invalid query range {min}..={max}")]
    InvalidRange { min: i64, max: i64 },

    /// Reading a sample payload or manifest failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be deserialized.
    #[error("invalid manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    /// Two samples in one series share a timestamp.
    #[error("duplicate sample at timestamp {timestamp} for series {series}")]
    DuplicateSample { series: String, timestamp: i64 },
}

/// Read-only handle to a time-indexed snapshot store.
pub trait SnapshotStore: Send + Sync {
    /// Open a query scope covering samples in `[min, max]`.
    fn querier(&self, min: i64, max: i64) -> Result<Box<dyn Querier + '_>, StoreError>;
}

/// A query scope over a fixed time range.
pub trait Querier {
    /// Series whose labels satisfy every matcher, in store order.
    fn select<'a>(&'a self, matchers: &[LabelMatcher]) -> Result<SeriesSet<'a>, StoreError>;
}

/// Iterator over selected series.
pub type SeriesSet<'a> = Box<dyn Iterator<Item = Box<dyn Series + 'a>> + 'a>;

/// One labelled series of recorded snapshots.
pub trait Series {
    fn labels(&self) -> &[Label];

    fn iterator(&self) -> Box<dyn SampleIterator + '_>;
}

/// Forward-only cursor over a series' samples.
pub trait SampleIterator {
    /// Advance to the first sample whose timestamp is `>= ts`.
    ///
    /// Never moves backwards: seeking to an earlier timestamp than the current
    /// position leaves the cursor where it is. Returns `false` once exhausted.
    fn seek(&mut self, ts: i64) -> bool;

    /// The sample under the cursor. Only valid after a successful `seek`.
    fn at(&self) -> (i64, &[u8]);
}
