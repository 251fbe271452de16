//! Trace View Adapter: parses a snapshot as a trace and serves one sub-view.

use std::sync::Arc;

use axum::response::Response;

use crate::dispatch::{DispatchError, IndexPage, TraceCatalog, TraceView, ViewRequest};
use crate::resolve::Snapshot;
use crate::trace::{TraceModel, TraceParser};

/// Serves trace sub-views from a shared, immutable catalog.
#[derive(Clone)]
pub struct TraceViewAdapter {
    parser: Arc<dyn TraceParser>,
    catalog: Arc<TraceCatalog>,
    index: Arc<IndexPage>,
}

impl TraceViewAdapter {
    pub fn new(parser: Arc<dyn TraceParser>, catalog: Arc<TraceCatalog>) -> Result<Self, tera::Error> {
        let index = Arc::new(IndexPage::new(&catalog)?);
        Ok(Self {
            parser,
            catalog,
            index,
        })
    }

    /// Parse `snapshot` and render the sub-view selected by `view.remainder`.
    pub fn serve(&self, snapshot: &Snapshot, view: &ViewRequest) -> Result<Response, DispatchError> {
        let selected = self.catalog.resolve(&view.remainder);
        let model = self.parser.parse(&snapshot.payload)?;

        tracing::debug!(
            view = selected.name(),
            remainder = %view.remainder,
            "Rendering trace view"
        );
        self.render(model.as_ref(), selected, view)
    }

    fn render(
        &self,
        model: &dyn TraceModel,
        selected: TraceView,
        view: &ViewRequest,
    ) -> Result<Response, DispatchError> {
        let response = match selected {
            TraceView::Blocking { kind, granularity } => {
                model.blocking_profile(kind, granularity, view)
            }
            TraceView::UserTasks => model.user_tasks(view),
            TraceView::UserTask => model.user_task(view),
            TraceView::UserRegions => model.user_regions(view),
            TraceView::UserRegion => model.user_region(view),
            TraceView::Goroutines => model.goroutines(view),
            TraceView::Goroutine => model.goroutine(view),
            TraceView::Mmu => model.mmu(view),
            TraceView::MmuPlot => model.mmu_plot(view),
            TraceView::MmuDetails => model.mmu_details(view),
            TraceView::RawTrace => model.raw_trace(view),
            TraceView::JsonTrace => model.json_trace(view),
            TraceView::Index => self.index.render(&view.base_path, &model.ranges())?,
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::index::TraceRange;
    use crate::dispatch::{BlockingKind, ErrorKind, Granularity};
    use crate::trace::{TraceError, UnavailableTraceParser};
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    struct NamedModel;

    impl NamedModel {
        fn named(&self, name: &str) -> Response {
            name.to_string().into_response()
        }
    }

    impl TraceModel for NamedModel {
        fn ranges(&self) -> Vec<TraceRange> {
            Vec::new()
        }
        fn blocking_profile(&self, kind: BlockingKind, granularity: Granularity, _: &ViewRequest) -> Response {
            self.named(&format!("{:?}/{:?}", kind, granularity))
        }
        fn user_tasks(&self, _: &ViewRequest) -> Response {
            self.named("usertasks")
        }
        fn user_task(&self, _: &ViewRequest) -> Response {
            self.named("usertask")
        }
        fn user_regions(&self, _: &ViewRequest) -> Response {
            self.named("userregions")
        }
        fn user_region(&self, _: &ViewRequest) -> Response {
            self.named("userregion")
        }
        fn goroutines(&self, _: &ViewRequest) -> Response {
            self.named("goroutines")
        }
        fn goroutine(&self, view: &ViewRequest) -> Response {
            self.named(&format!("goroutine {}", view.query_param("id").unwrap_or_else(|| "?".into())))
        }
        fn mmu(&self, _: &ViewRequest) -> Response {
            self.named("mmu")
        }
        fn mmu_plot(&self, _: &ViewRequest) -> Response {
            self.named("mmuPlot")
        }
        fn mmu_details(&self, _: &ViewRequest) -> Response {
            self.named("mmuDetails")
        }
        fn raw_trace(&self, _: &ViewRequest) -> Response {
            self.named("trace")
        }
        fn json_trace(&self, _: &ViewRequest) -> Response {
            self.named("jsontrace")
        }
    }

    struct NamedParser;

    impl TraceParser for NamedParser {
        fn parse(&self, raw: &[u8]) -> Result<Box<dyn TraceModel>, TraceError> {
            if raw.is_empty() {
                return Err(TraceError::Parse("empty trace".into()));
            }
            Ok(Box::new(NamedModel))
        }
    }

    fn adapter(parser: Arc<dyn TraceParser>) -> TraceViewAdapter {
        TraceViewAdapter::new(parser, Arc::new(TraceCatalog::new())).unwrap()
    }

    fn snapshot(payload: &[u8]) -> Snapshot {
        Snapshot {
            profile_type: "trace".into(),
            timestamp: 1,
            payload: payload.to_vec(),
        }
    }

    fn view(remainder: &str, query: Option<&str>) -> ViewRequest {
        ViewRequest {
            remainder: remainder.into(),
            query: query.map(str::to_string),
            base_path: "/pprof/abc/1".into(),
        }
    }

    async fn rendered(adapter: &TraceViewAdapter, remainder: &str, query: Option<&str>) -> String {
        let response = adapter.serve(&snapshot(b"trace"), &view(remainder, query)).unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_literal_views_reach_renderers() {
        let adapter = adapter(Arc::new(NamedParser));
        assert_eq!(rendered(&adapter, "/goroutines", None).await, "goroutines");
        assert_eq!(rendered(&adapter, "/goroutine", Some("id=12")).await, "goroutine 12");
        assert_eq!(rendered(&adapter, "/goroutine", Some("id=%31%32")).await, "goroutine 12");
        assert_eq!(rendered(&adapter, "/mmuPlot", None).await, "mmuPlot");
        assert_eq!(rendered(&adapter, "/io", None).await, "Io/Execution");
        assert_eq!(rendered(&adapter, "/regionsched", None).await, "Sched/Region");
        assert_eq!(rendered(&adapter, "/jsontrace", Some("start=0")).await, "jsontrace");
    }

    #[tokio::test]
    async fn test_unknown_view_renders_index() {
        let adapter = adapter(Arc::new(NamedParser));
        let body = rendered(&adapter, "/nonexistent", None).await;
        assert!(body.contains("&#x2F;pprof&#x2F;abc&#x2F;1&#x2F;goroutines"), "{}", body);
    }

    #[test]
    fn test_parse_failure() {
        let adapter = adapter(Arc::new(NamedParser));
        let err = adapter.serve(&snapshot(b""), &view("/goroutines", None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Downstream);
    }

    #[test]
    fn test_unavailable_parser() {
        let adapter = adapter(Arc::new(UnavailableTraceParser));
        let err = adapter.serve(&snapshot(b"trace"), &view("/", None)).unwrap_err();
        assert_eq!(err.to_string(), "parse trace: trace analysis is not available");
    }
}
