// src/error.rs
//! Request-level error taxonomy. Everything is recovered at the handler boundary
//! and turned into `{"error": "..."}` with 400 or 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use serde_json::json;

use crate::feed::FeedError;
use crate::interpret::InterpretationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("the '{0}' parameter is required")]
    MissingParameter(&'static str),
    #[error("invalid '{name}' parameter: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("failed to fetch posts from the feed")]
    UpstreamFetch(#[from] FeedError),
    #[error("no content generated")]
    NoContentFromModel,
    #[error(transparent)]
    Interpretation(#[from] InterpretationError),
    #[error("{0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) | ApiError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::UpstreamFetch(cause) => {
                tracing::error!(error = %cause, "feed request failed");
            }
            ApiError::Interpretation(e) => {
                counter!("digest_interpretation_errors_total").increment(1);
                tracing::warn!(reason = %e.reason, "model response not understood");
            }
            ApiError::Unexpected(e) => {
                tracing::error!(error = ?e, "unexpected error");
            }
            _ => {}
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
