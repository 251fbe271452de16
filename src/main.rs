//! Profile snapshot view server.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET {prefix}/{series}/{timestamp}/{view...}
//!          │
//!          ▼
//!   ┌─────────────┐    ┌──────────────┐    ┌──────────────────┐
//!   │ http server │───▶│   resolve    │───▶│ dispatch router  │
//!   │ request id  │    │ path, series │    │ trace / generic  │
//!   └─────────────┘    │  timestamp   │    └────┬────────┬────┘
//!                      └──────────────┘         │        │
//!                                               ▼        ▼
//!                                    ┌────────────┐  ┌────────────────┐
//!                                    │ trace view │  │ generic profile│
//!                                    │  adapter   │  │ adapter/engine │
//!                                    └─────┬──────┘  └───────┬────────┘
//!                                          │                 │
//!                                          ▼                 ▼
//!                                    ┌──────────────────────────────┐
//!                                    │   snapshot store (fetcher)   │
//!                                    └──────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use profview::config::{load_config, ServerConfig};
use profview::engine::RawEngine;
use profview::lifecycle::shutdown_signal;
use profview::observability::{logging, metrics};
use profview::store::MemoryStore;
use profview::trace::UnavailableTraceParser;
use profview::HttpServer;

#[derive(Parser)]
#[command(name = "profview")]
#[command(about = "Serve interactive views of stored profile snapshots", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("profview v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        prefix = %config.routing.prefix,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let store = match &config.store.manifest_path {
        Some(path) => MemoryStore::load_manifest(path)?,
        None => {
            tracing::warn!("No store manifest configured, serving an empty store");
            MemoryStore::new()
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(
        config,
        Arc::new(store),
        Arc::new(UnavailableTraceParser),
        RawEngine,
    )?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
