//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting engine errors to appropriate HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use weight_progress_shared::RegistryError;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("No data fetched yet for profile: {0}")]
    SnapshotNotReady(String),

    #[error("Projection failed: {0}")]
    Projection(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ProfileNotFound(name) => ApiError::ProfileNotFound(name),
            RegistryError::NoSnapshot(name) => ApiError::SnapshotNotReady(name),
            RegistryError::Projection { .. } => ApiError::Projection(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::ProfileNotFound(_) => {
                (StatusCode::NOT_FOUND, "PROFILE_NOT_FOUND", self.to_string())
            }
            ApiError::SnapshotNotReady(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SNAPSHOT_NOT_READY",
                self.to_string(),
            ),
            ApiError::Projection(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PROJECTION_FAILED",
                self.to_string(),
            ),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_not_found_status() {
        let error = ApiError::ProfileNotFound("alice".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_snapshot_not_ready_status() {
        let error = ApiError::SnapshotNotReady("alice".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_projection_failed_status() {
        let error = ApiError::Projection("empty history".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_registry_error_mapping() {
        let api: ApiError = RegistryError::NoSnapshot("alice".to_string()).into();
        assert!(matches!(api, ApiError::SnapshotNotReady(name) if name == "alice"));

        let api: ApiError = RegistryError::ProfileNotFound("bob".to_string()).into();
        assert!(matches!(api, ApiError::ProfileNotFound(name) if name == "bob"));
    }
}
