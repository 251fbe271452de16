//! Profile snapshot view server library.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolve;
pub mod store;
pub mod trace;

pub use config::schema::ServerConfig;
pub use dispatch::{DispatchError, DispatchRouter, ErrorKind};
pub use http::HttpServer;
pub use resolve::{SnapshotFetcher, SnapshotKey};
pub use store::{MemoryStore, SnapshotStore};
