//! Request path splitting.
//!
//! # Responsibilities
//! - Strip the mount prefix
//! - Normalize `.`, `..` and repeated separators
//! - Split into series token, timestamp token and sub-view remainder
//!
//! # Design Decisions
//! - Fewer than two segments yields an empty `ResolvedPath`, never a panic
//! - A `..` that climbs above the first segment also yields an empty
//!   `ResolvedPath`; it never shifts the request onto other segments
//! - The remainder always starts with `/` so sub-view lookups compare
//!   against absolute-looking paths

use std::path::{Component, Path};

use normalize_path::NormalizePath;

/// Components of a snapshot request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPath {
    pub series: String,
    pub timestamp: String,
    pub remainder: String,
}

impl ResolvedPath {
    /// True when the path could not be resolved.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.timestamp.is_empty() && self.remainder.is_empty()
    }
}

/// Split `request_path` mounted under `prefix` (e.g. `/pprof`).
pub fn resolve_path(prefix: &str, request_path: &str) -> ResolvedPath {
    let trimmed = match request_path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => request_path,
    };
    let relative = Path::new(trimmed.trim_start_matches('/'));
    if climbs_above_start(relative) {
        return ResolvedPath::default();
    }
    let normalized = relative.normalize();

    let parts: Vec<&str> = normalized
        .iter()
        .filter_map(|c| c.to_str())
        .filter(|c| *c != "/")
        .collect();

    match parts.as_slice() {
        [series, timestamp, rest @ ..] => {
            let joined = rest.join("/");
            let remainder = if joined.starts_with('/') {
                joined
            } else {
                format!("/{}", joined)
            };
            ResolvedPath {
                series: series.to_string(),
                timestamp: timestamp.to_string(),
                remainder,
            }
        }
        _ => ResolvedPath::default(),
    }
}

/// True if some `..` in `path` would step above its first segment.
fn climbs_above_start(path: &Path) -> bool {
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return true,
            },
            _ => {}
        }
    }
    false
}
