//! Trace sub-view catalog.
//!
//! # Responsibilities
//! - Map literal remainders (`/goroutines`, `/mmu`, ...) to trace sub-views
//! - Recognize the `/jsontrace` prefix (query strings and suffixes allowed)
//! - Fall back to the index page for everything else
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards
//! - Enumerable so the index page and tests can walk every entry
//! - Lookup is total: every remainder resolves to some view

use std::collections::BTreeMap;

/// Remainder prefix selecting the JSON trace export.
pub const JSON_TRACE_PREFIX: &str = "/jsontrace";

/// Category of goroutine blocking profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockingKind {
    /// Network I/O.
    Io,
    /// Synchronization primitives.
    Sync,
    Syscall,
    /// Scheduler latency.
    Sched,
}

impl BlockingKind {
    pub const ALL: [BlockingKind; 4] = [
        BlockingKind::Io,
        BlockingKind::Sync,
        BlockingKind::Syscall,
        BlockingKind::Sched,
    ];

    /// Path segment of the whole-execution view, e.g. `io`.
    pub fn segment(&self) -> &'static str {
        match self {
            BlockingKind::Io => "io",
            BlockingKind::Sync => "block",
            BlockingKind::Syscall => "syscall",
            BlockingKind::Sched => "sched",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BlockingKind::Io => "Network blocking profile",
            BlockingKind::Sync => "Synchronization blocking profile",
            BlockingKind::Syscall => "Syscall blocking profile",
            BlockingKind::Sched => "Scheduler latency profile",
        }
    }
}

/// Whether a blocking profile covers the whole execution or is split per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Execution,
    Region,
}

/// One analytical rendering of an execution trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceView {
    Blocking {
        kind: BlockingKind,
        granularity: Granularity,
    },
    UserTasks,
    UserTask,
    UserRegions,
    UserRegion,
    Goroutines,
    Goroutine,
    Mmu,
    MmuPlot,
    MmuDetails,
    RawTrace,
    JsonTrace,
    Index,
}

impl TraceView {
    /// Short name for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            TraceView::Blocking {
                kind,
                granularity: Granularity::Execution,
            } => kind.segment(),
            TraceView::Blocking {
                kind,
                granularity: Granularity::Region,
            } => match kind {
                BlockingKind::Io => "regionio",
                BlockingKind::Sync => "regionblock",
                BlockingKind::Syscall => "regionsyscall",
                BlockingKind::Sched => "regionsched",
            },
            TraceView::UserTasks => "usertasks",
            TraceView::UserTask => "usertask",
            TraceView::UserRegions => "userregions",
            TraceView::UserRegion => "userregion",
            TraceView::Goroutines => "goroutines",
            TraceView::Goroutine => "goroutine",
            TraceView::Mmu => "mmu",
            TraceView::MmuPlot => "mmuPlot",
            TraceView::MmuDetails => "mmuDetails",
            TraceView::RawTrace => "trace",
            TraceView::JsonTrace => "jsontrace",
            TraceView::Index => "index",
        }
    }
}

const fn blocking(kind: BlockingKind, granularity: Granularity) -> TraceView {
    TraceView::Blocking { kind, granularity }
}

const LITERAL_VIEWS: [(&str, TraceView); 17] = [
    ("/io", blocking(BlockingKind::Io, Granularity::Execution)),
    ("/block", blocking(BlockingKind::Sync, Granularity::Execution)),
    ("/syscall", blocking(BlockingKind::Syscall, Granularity::Execution)),
    ("/sched", blocking(BlockingKind::Sched, Granularity::Execution)),
    ("/regionblock", blocking(BlockingKind::Sync, Granularity::Region)),
    ("/regionsyscall", blocking(BlockingKind::Syscall, Granularity::Region)),
    ("/regionsched", blocking(BlockingKind::Sched, Granularity::Region)),
    ("/usertasks", TraceView::UserTasks),
    ("/usertask", TraceView::UserTask),
    ("/userregions", TraceView::UserRegions),
    ("/userregion", TraceView::UserRegion),
    ("/goroutines", TraceView::Goroutines),
    ("/goroutine", TraceView::Goroutine),
    ("/mmu", TraceView::Mmu),
    ("/mmuPlot", TraceView::MmuPlot),
    ("/mmuDetails", TraceView::MmuDetails),
    ("/trace", TraceView::RawTrace),
];

/// Literal remainder → sub-view mapping.
#[derive(Debug, Clone)]
pub struct TraceCatalog {
    views: BTreeMap<&'static str, TraceView>,
}

impl TraceCatalog {
    pub fn new() -> Self {
        Self {
            views: LITERAL_VIEWS.into_iter().collect(),
        }
    }

    /// Select the sub-view for a remainder.
    pub fn resolve(&self, remainder: &str) -> TraceView {
        if let Some(view) = self.views.get(remainder) {
            return *view;
        }
        if remainder.starts_with(JSON_TRACE_PREFIX) {
            return TraceView::JsonTrace;
        }
        TraceView::Index
    }

    /// Literal entries, ordered by path.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, TraceView)> + '_ {
        self.views.iter().map(|(path, view)| (*path, *view))
    }

    /// Literal path registered for `view`, if any.
    pub fn path_of(&self, view: TraceView) -> Option<&'static str> {
        self.entries().find(|(_, v)| *v == view).map(|(path, _)| path)
    }
}

impl Default for TraceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
