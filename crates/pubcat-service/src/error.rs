//! API error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body is not JSON, not an object, or lacks required fields
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Body parsed but violates field constraints
    #[error("invalid publication: {0}")]
    InvalidPublication(String),

    /// Record store write or read failed
    #[error("storage failure: {0}")]
    Storage(String),

    /// Record is durable in the store but missing from the search index
    #[error("publication {id} was stored but not indexed: {reason}")]
    IndexWriteFailed { id: String, reason: String },

    /// Search index query failed
    #[error("search failure: {0}")]
    Search(String),

    /// Engine work did not run to completion
    #[error("internal error: {0}")]
    Internal(String),

    /// Static asset missing from disk
    #[error("asset not found: {0}")]
    AssetNotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidPublication(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_)
            | ApiError::IndexWriteFailed { .. }
            | ApiError::Search(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::IndexWriteFailed { id, .. } => json!({ "error": self.to_string(), "_id": id }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
