//! Trace index page.
//!
//! Lists the top-level trace views of a snapshot, with raw-download links for
//! the whole-execution blocking profiles. Detail views (`/goroutine`,
//! `/usertask`, ...) need an identifier and are reached from the listings.

use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use tera::{Context, Tera};

use crate::dispatch::catalog::{BlockingKind, Granularity, TraceCatalog, TraceView};

/// Template name; the `.html` suffix turns on autoescaping.
const TEMPLATE_NAME: &str = "index.html";

const TEMPLATE: &str = r#"<html>
<body>
{% if ranges %}{% for range in ranges %}<a href="{{ range.href }}">View trace ({{ range.name }})</a><br>
{% endfor %}<br>
{% else %}<a href="{{ base }}/trace">View trace</a><br>
{% endif %}{% for link in links %}<a href="{{ base }}{{ link.path }}">{{ link.title }}</a>{% if link.download %} (<a href="{{ base }}{{ link.path }}?raw=1" download="{{ link.download }}">&#x2B07;</a>){% endif %}<br>
{% endfor %}</body>
</html>
"#;

/// A named slice of a large trace, as reported by the trace model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRange {
    pub name: String,
    /// Link target, relative to the snapshot base path when it starts with `/`.
    pub url: String,
}

#[derive(Serialize)]
struct RangeLink<'a> {
    name: &'a str,
    href: String,
}

#[derive(Debug, Clone, Serialize)]
struct IndexLink {
    path: &'static str,
    title: &'static str,
    /// File name offered for the raw download, if any.
    download: Option<String>,
}

/// Index page layout and compiled template, built once at startup.
#[derive(Clone)]
pub struct IndexPage {
    links: Vec<IndexLink>,
    tera: Tera,
}

const LISTED_VIEWS: [(TraceView, &str); 10] = [
    (TraceView::Goroutines, "Goroutine analysis"),
    (
        TraceView::Blocking {
            kind: BlockingKind::Io,
            granularity: Granularity::Execution,
        },
        "",
    ),
    (
        TraceView::Blocking {
            kind: BlockingKind::Sync,
            granularity: Granularity::Execution,
        },
        "",
    ),
    (
        TraceView::Blocking {
            kind: BlockingKind::Syscall,
            granularity: Granularity::Execution,
        },
        "",
    ),
    (
        TraceView::Blocking {
            kind: BlockingKind::Sched,
            granularity: Granularity::Execution,
        },
        "",
    ),
    (
        TraceView::Blocking {
            kind: BlockingKind::Sync,
            granularity: Granularity::Region,
        },
        "Synchronization blocking profile by region",
    ),
    (
        TraceView::Blocking {
            kind: BlockingKind::Syscall,
            granularity: Granularity::Region,
        },
        "Syscall blocking profile by region",
    ),
    (
        TraceView::Blocking {
            kind: BlockingKind::Sched,
            granularity: Granularity::Region,
        },
        "Scheduler latency profile by region",
    ),
    (TraceView::UserTasks, "User-defined tasks"),
    (TraceView::UserRegions, "User-defined regions"),
];

impl IndexPage {
    /// Lay out the page from the catalog and compile its template.
    pub fn new(catalog: &TraceCatalog) -> Result<Self, tera::Error> {
        let mut links = Vec::new();
        for (view, title) in LISTED_VIEWS {
            let Some(path) = catalog.path_of(view) else {
                continue;
            };
            let (title, download) = match view {
                TraceView::Blocking {
                    kind,
                    granularity: Granularity::Execution,
                } => (kind.title(), Some(format!("{}.profile", kind.segment()))),
                _ => (title, None),
            };
            links.push(IndexLink {
                path,
                title,
                download,
            });
        }
        if let Some(path) = catalog.path_of(TraceView::Mmu) {
            links.push(IndexLink {
                path,
                title: "Minimum mutator utilization",
                download: None,
            });
        }
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;

        Ok(Self { links, tera })
    }

    /// Render the page for one snapshot.
    ///
    /// With no ranges the whole trace is linked; otherwise one link per range.
    pub fn render(&self, base_path: &str, ranges: &[TraceRange]) -> Result<Response, tera::Error> {
        let ranges: Vec<RangeLink<'_>> = ranges
            .iter()
            .map(|range| RangeLink {
                name: &range.name,
                href: if range.url.starts_with('/') {
                    format!("{}{}", base_path, range.url)
                } else {
                    range.url.clone()
                },
            })
            .collect();

        let mut context = Context::new();
        context.insert("base", base_path);
        context.insert("ranges", &ranges);
        context.insert("links", &self.links);
        let body = self.tera.render(TEMPLATE_NAME, &context)?;

        Ok(([(header::CACHE_CONTROL, "no-store")], Html(body)).into_response())
    }
}
