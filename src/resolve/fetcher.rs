//! Point lookup of a snapshot in the store.

use std::sync::Arc;

use crate::observability::metrics;
use crate::resolve::{ResolveError, Snapshot, SnapshotKey};
use crate::store::SnapshotStore;

/// Bounded point lookup against a shared, read-only snapshot store.
#[derive(Clone)]
pub struct SnapshotFetcher {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotFetcher {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Fetch the first sample at or after `key.timestamp` in the first series
    /// matching every matcher of `key.selector`.
    ///
    /// Selectors matching several series resolve to whichever series the store
    /// yields first; this is not treated as an error.
    pub fn fetch(&self, key: &SnapshotKey) -> Result<Snapshot, ResolveError> {
        let result = self.lookup(key);
        metrics::record_lookup(match &result {
            Ok(_) => "hit",
            Err(e) if e.kind() == crate::dispatch::ErrorKind::NotFound => "miss",
            Err(_) => "error",
        });
        result
    }

    fn lookup(&self, key: &SnapshotKey) -> Result<Snapshot, ResolveError> {
        let querier = self.store.querier(0, i64::MAX)?;
        let mut set = querier.select(key.selector.matchers())?;

        let series = set
            .next()
            .ok_or_else(|| ResolveError::NoSeries(key.selector.to_string()))?;
        if set.next().is_some() {
            tracing::debug!(
                selector = %key.selector,
                "Selector matches more than one series, using the first"
            );
        }

        let mut it = series.iterator();
        if !it.seek(key.timestamp) {
            return Err(ResolveError::NoSample(key.timestamp));
        }
        let (timestamp, payload) = it.at();

        tracing::debug!(
            selector = %key.selector,
            requested = key.timestamp,
            found = timestamp,
            bytes = payload.len(),
            "Snapshot fetched"
        );

        Ok(Snapshot {
            profile_type: key.selector.profile_type().to_string(),
            timestamp,
            payload: payload.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{LabelMatcher, SeriesSelector};
    use crate::store::{Label, MemoryStore};

    fn fetcher() -> SnapshotFetcher {
        let mut store = MemoryStore::new();
        let labels = vec![Label::new("profile_type", "heap"), Label::new("job", "api")];
        store.append(labels.clone(), 100, b"first".to_vec()).unwrap();
        store.append(labels, 200, b"second".to_vec()).unwrap();
        store
            .append(
                vec![Label::new("profile_type", "heap"), Label::new("job", "worker")],
                100,
                b"worker".to_vec(),
            )
            .unwrap();
        SnapshotFetcher::new(Arc::new(store))
    }

    fn key(matchers: Vec<LabelMatcher>, timestamp: i64) -> SnapshotKey {
        SnapshotKey {
            selector: SeriesSelector::new(matchers, "profile_type"),
            timestamp,
        }
    }

    #[test]
    fn test_fetch_exact_timestamp() {
        let snap = fetcher()
            .fetch(&key(vec![LabelMatcher::equal("job", "api")], 200))
            .unwrap();
        assert_eq!(snap.timestamp, 200);
        assert_eq!(snap.payload, b"second");
        assert_eq!(snap.profile_type, "");
    }

    #[test]
    fn test_fetch_before_first_sample_returns_first() {
        let snap = fetcher()
            .fetch(&key(vec![LabelMatcher::equal("job", "api")], 0))
            .unwrap();
        assert_eq!(snap.timestamp, 100);
        assert_eq!(snap.payload, b"first");
    }

    #[test]
    fn test_fetch_seeks_forward() {
        let snap = fetcher()
            .fetch(&key(vec![LabelMatcher::equal("job", "api")], 101))
            .unwrap();
        assert_eq!(snap.timestamp, 200);
    }

    #[test]
    fn test_fetch_past_last_sample() {
        let err = fetcher()
            .fetch(&key(vec![LabelMatcher::equal("job", "api")], 201))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoSample(201)));
    }

    #[test]
    fn test_fetch_no_series() {
        let err = fetcher()
            .fetch(&key(vec![LabelMatcher::equal("job", "db")], 100))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoSeries(_)));
    }

    #[test]
    fn test_fetch_ambiguous_selector_takes_first() {
        let snap = fetcher()
            .fetch(&key(vec![LabelMatcher::equal("profile_type", "heap")], 100))
            .unwrap();
        assert_eq!(snap.payload, b"first");
        assert_eq!(snap.profile_type, "heap");
    }
}
