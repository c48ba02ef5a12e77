//! Error handling for HTTP responses.
//!
//! Error bodies are `{error: string}` per the external interface design —
//! deliberately flatter than a CMS-style `{code,message,details,request_id}`
//! envelope, because the contract here names exactly that shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ratelimit_core::Error as CoreError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP error wrapper for Axum.
pub struct HttpError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// The single exhaustive mapping from the core's five error kinds onto
/// HTTP. `Decision::RateLimited` never reaches this mapping — it is a
/// successful decision, produced from a handler's `Ok` branch, not an
/// error.
impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::NotFound { .. } => {
                HttpError::not_found(err.external_message())
            }
            CoreError::UserStoreError { message, .. } => {
                tracing::warn!(cause = %message, "user store error");
                HttpError::internal_error(err.external_message())
            }
            CoreError::StoreError { message, .. } => {
                tracing::warn!(cause = %message, "counter store error");
                HttpError::internal_error(err.external_message())
            }
            CoreError::ConfigError { message } => {
                tracing::warn!(cause = %message, "config error");
                HttpError::internal_error(err.external_message())
            }
            CoreError::BadRequest { .. } => HttpError::bad_request(err.external_message()),
        }
    }
}

pub type HttpResult<T> = Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let http_err: HttpError = CoreError::not_found("u1").into();
        assert_eq!(http_err.status, StatusCode::NOT_FOUND);
        assert_eq!(http_err.body.error, "User u1 not found");
    }

    #[test]
    fn user_store_error_maps_to_500_with_classified_message() {
        let http_err: HttpError = CoreError::user_store("connection refused").into();
        assert_eq!(http_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http_err.body.error, "Database error");
    }

    #[test]
    fn store_error_maps_to_500_cache_error() {
        let http_err: HttpError = CoreError::store("non-numeric result").into();
        assert_eq!(http_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http_err.body.error, "Cache error");
    }

    #[test]
    fn config_error_maps_to_500_config_error() {
        let http_err: HttpError = CoreError::config("missing tier").into();
        assert_eq!(http_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http_err.body.error, "Config error");
    }

    #[test]
    fn bad_request_maps_to_400_with_original_message() {
        let http_err: HttpError = CoreError::bad_request("invalid uuid").into();
        assert_eq!(http_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(http_err.body.error, "invalid uuid");
    }
}
