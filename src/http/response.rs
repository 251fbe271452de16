//! Error response mapping.
//!
//! # Design Decisions
//! - Client-side resolution failures and unknown endpoints are 404 with the error text
//! - Store, trace parser and engine failures are 502
//! - Error bodies are plain text

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::dispatch::{DispatchError, ErrorKind};

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest | ErrorKind::NotFound | ErrorKind::UnknownEndpoint => {
            StatusCode::NOT_FOUND
        }
        ErrorKind::Downstream => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (status_for(self.kind()), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::trace::TraceError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::BadRequest), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::UnknownEndpoint), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Downstream), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_unknown_endpoint_body() {
        let response =
            DispatchError::from(EngineError::UnknownEndpoint("/nonexistent".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"unknown endpoint /nonexistent");
    }

    #[test]
    fn test_trace_failure_is_bad_gateway() {
        let response = DispatchError::from(TraceError::Parse("truncated".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
