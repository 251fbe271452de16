//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → resolve the shutdown future
//!     → HTTP server stops accepting, drains in-flight requests, exits
//! ```

pub mod signals;

pub use signals::shutdown_signal;
