//! HTTP error mapping.

use crate::error::JobError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Job(#[from] JobError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Job(JobError::InvalidParameters(_) | JobError::EmptyCut { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Job(JobError::SourceNotFound(_) | JobError::TaskNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Job(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::from(JobError::invalid("x")), StatusCode::BAD_REQUEST),
            (
                ApiError::from(JobError::EmptyCut {
                    start: 1.0,
                    duration: 1.0,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(JobError::SourceNotFound("v.mp4".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(JobError::TaskNotFound("t".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(JobError::ProbeFailure("p".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::bad_request("b"), StatusCode::BAD_REQUEST),
            (ApiError::not_found("n"), StatusCode::NOT_FOUND),
            (ApiError::internal("i"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
