//! In-memory snapshot store.
//!
//! Series are kept in insertion order with samples sorted by timestamp.
//! A store can be populated programmatically via [`MemoryStore::append`] or
//! loaded from a TOML manifest:
//!
//! ```toml
//! [[series]]
//! labels = { profile_type = "heap", job = "api" }
//!
//! [[series.samples]]
//! timestamp = 1700000000000
//! path = "heap-1700000000000.pb.gz"
//! ```
//!
//! Sample paths are resolved relative to the manifest's directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::resolve::LabelMatcher;
use crate::store::{Label, Querier, SampleIterator, Series, SeriesSet, SnapshotStore, StoreError};

/// A store holding every sample in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    series: Vec<MemorySeries>,
}

#[derive(Debug)]
struct MemorySeries {
    labels: Vec<Label>,
    samples: Vec<(i64, Arc<[u8]>)>,
}

impl MemorySeries {
    fn matches(&self, matchers: &[LabelMatcher]) -> bool {
        matchers.iter().all(|m| {
            let value = self
                .labels
                .iter()
                .find(|l| l.name == m.name)
                .map(|l| l.value.as_str())
                .unwrap_or("");
            value == m.value
        })
    }

    /// Samples with timestamps inside `[min, max]`.
    fn window(&self, min: i64, max: i64) -> &[(i64, Arc<[u8]>)] {
        let lo = self.samples.partition_point(|(t, _)| *t < min);
        let hi = self.samples.partition_point(|(t, _)| *t <= max);
        self.samples.get(lo..hi).unwrap_or(&[])
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample, creating the series on first use.
    pub fn append(
        &mut self,
        labels: Vec<Label>,
        timestamp: i64,
        payload: impl Into<Arc<[u8]>>,
    ) -> Result<(), StoreError> {
        let mut labels = labels;
        labels.sort();

        let idx = match self.series.iter().position(|s| s.labels == labels) {
            Some(idx) => idx,
            None => {
                self.series.push(MemorySeries {
                    labels,
                    samples: Vec::new(),
                });
                self.series.len() - 1
            }
        };
        let series = &mut self.series[idx];

        match series.samples.binary_search_by_key(&timestamp, |(t, _)| *t) {
            Ok(_) => Err(StoreError::DuplicateSample {
                series: format_labels(&series.labels),
                timestamp,
            }),
            Err(pos) => {
                series.samples.insert(pos, (timestamp, payload.into()));
                Ok(())
            }
        }
    }

    /// Number of distinct series.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Load a store from a TOML manifest on disk.
    pub fn load_manifest(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest = toml::from_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let mut store = Self::new();
        for entry in manifest.series {
            let labels: Vec<Label> = entry
                .labels
                .into_iter()
                .map(|(name, value)| Label::new(name, value))
                .collect();
            for sample in entry.samples {
                let sample_path = base.join(&sample.path);
                let payload = fs::read(&sample_path).map_err(|source| StoreError::Io {
                    path: sample_path.clone(),
                    source,
                })?;
                store.append(labels.clone(), sample.timestamp, payload)?;
            }
        }

        tracing::info!(
            manifest = %path.display(),
            series = store.series_count(),
            "Snapshot manifest loaded"
        );
        Ok(store)
    }
}

impl SnapshotStore for MemoryStore {
    fn querier(&self, min: i64, max: i64) -> Result<Box<dyn Querier + '_>, StoreError> {
        if min > max {
            return Err(StoreError::InvalidRange { min, max });
        }
        Ok(Box::new(MemoryQuerier {
            store: self,
            min,
            max,
        }))
    }
}

struct MemoryQuerier<'a> {
    store: &'a MemoryStore,
    min: i64,
    max: i64,
}

impl Querier for MemoryQuerier<'_> {
    fn select<'a>(&'a self, matchers: &[LabelMatcher]) -> Result<SeriesSet<'a>, StoreError> {
        let (min, max) = (self.min, self.max);
        let matchers = matchers.to_vec();
        let selected = self
            .store
            .series
            .iter()
            .filter(move |s| s.matches(&matchers))
            .filter_map(move |s| {
                let samples = s.window(min, max);
                if samples.is_empty() {
                    return None;
                }
                Some(Box::new(SeriesView {
                    labels: &s.labels,
                    samples,
                }) as Box<dyn Series + 'a>)
            });
        Ok(Box::new(selected))
    }
}

struct SeriesView<'a> {
    labels: &'a [Label],
    samples: &'a [(i64, Arc<[u8]>)],
}

impl Series for SeriesView<'_> {
    fn labels(&self) -> &[Label] {
        self.labels
    }

    fn iterator(&self) -> Box<dyn SampleIterator + '_> {
        Box::new(MemoryIterator {
            samples: self.samples,
            pos: 0,
        })
    }
}

struct MemoryIterator<'a> {
    samples: &'a [(i64, Arc<[u8]>)],
    pos: usize,
}

impl SampleIterator for MemoryIterator<'_> {
    fn seek(&mut self, ts: i64) -> bool {
        let rest = self.samples.get(self.pos..).unwrap_or(&[]);
        self.pos += rest.partition_point(|(t, _)| *t < ts);
        self.pos < self.samples.len()
    }

    fn at(&self) -> (i64, &[u8]) {
        match self.samples.get(self.pos) {
            Some((t, payload)) => (*t, payload),
            None => (i64::MIN, &[]),
        }
    }
}

/// Render labels in selector notation, e.g. `{job="api",profile_type="heap"}`.
pub fn format_labels(labels: &[Label]) -> String {
    let inner: Vec<String> = labels
        .iter()
        .map(|l| format!("{}={:?}", l.name, l.value))
        .collect();
    format!("{{{}}}", inner.join(","))
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    series: Vec<ManifestSeries>,
}

#[derive(Debug, Deserialize)]
struct ManifestSeries {
    labels: BTreeMap<String, String>,
    #[serde(default)]
    samples: Vec<ManifestSample>,
}

#[derive(Debug, Deserialize)]
struct ManifestSample {
    timestamp: i64,
    path: PathBuf,
}
