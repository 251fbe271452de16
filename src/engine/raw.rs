//! Built-in engine that exposes snapshots without interpreting them.
//!
//! Registers `/` (a short plain-text summary) and `/raw` (the snapshot bytes
//! as a download). Used when no richer exploration engine is linked in.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header;
use axum::response::IntoResponse;

use crate::dispatch::ViewRequest;
use crate::engine::{EngineError, EngineHandler, EngineOptions, ExplorerEngine, HandlerMapArgs};

#[derive(Debug, Clone, Copy, Default)]
pub struct RawEngine;

impl ExplorerEngine for RawEngine {
    type Profile = Arc<[u8]>;

    fn decode_profile(&self, raw: &[u8]) -> Result<Self::Profile, EngineError> {
        if raw.is_empty() {
            return Err(EngineError::Decode("empty profile".to_string()));
        }
        Ok(Arc::from(raw))
    }

    fn run(&self, options: EngineOptions<'_, Self::Profile>) -> Result<(), EngineError> {
        options.ui.print(&format!("raw engine flags: {}", options.flags.args().join(" ")));
        let (profile, source) =
            options
                .fetch
                .fetch(&options.flags.target, Duration::ZERO, Duration::ZERO)?;

        let mut handlers: HashMap<String, EngineHandler> = HashMap::new();

        let summary = profile.clone();
        handlers.insert(
            "/".to_string(),
            Box::new(move |view: &ViewRequest| {
                format!(
                    "snapshot {}\nsource: {}\nsize: {} bytes\ndownload: {}/raw\n",
                    view.base_path,
                    if source.is_empty() { "store" } else { source.as_str() },
                    summary.len(),
                    view.base_path,
                )
                .into_response()
            }),
        );

        handlers.insert(
            "/raw".to_string(),
            Box::new(move |_: &ViewRequest| {
                (
                    [
                        (header::CONTENT_TYPE, "application/octet-stream"),
                        (header::CONTENT_DISPOSITION, "attachment; filename=\"profile\""),
                    ],
                    profile.to_vec(),
                )
                    .into_response()
            }),
        );

        let (host, port) = options.flags.http_host_port();
        options.http_server.serve(HandlerMapArgs {
            host,
            port,
            handlers,
        })
    }
}
