//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID)
//!     → dispatch router (blocking pool)
//!     → response.rs (error → status code)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id_middleware, RequestId, RequestIdExt, X_REQUEST_ID};
pub use response::status_for;
pub use server::{AppState, HttpServer};
