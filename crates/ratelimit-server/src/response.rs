//! Response bodies for the three external endpoints. Shapes are dictated
//! by the external interface design, not by the CMS's generic
//! `SuccessResponse<T>` envelope — this contract is small and literal
//! enough to warrant bespoke types instead.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ratelimit_core::{Decision, OverrideFields, RateLimitStats};
use serde::Serialize;
use uuid::Uuid;

/// `GET /api/check` success body.
#[derive(Debug, Serialize)]
pub struct CheckAllowedBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub status: &'static str,
}

/// `GET /api/check` rate-limited body. `RetryAfter` is a string, per the
/// documented shape, and the same value is duplicated into the
/// `Retry-After` header.
#[derive(Debug, Serialize)]
pub struct CheckRateLimitedBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub status: &'static str,
    #[serde(rename = "RetryAfter")]
    pub retry_after: String,
}

/// Turns a [`Decision`] into the exact response the HTTP surface promises.
/// `RateLimited` is a success here — it never travels through `HttpError`.
pub struct CheckResponse(pub Decision);

impl IntoResponse for CheckResponse {
    fn into_response(self) -> Response {
        match self.0 {
            Decision::Allowed => (
                StatusCode::OK,
                Json(CheckAllowedBody {
                    status_code: 200,
                    status: "ALLOWED",
                }),
            )
                .into_response(),
            Decision::RateLimited {
                retry_after_seconds,
            } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(CheckRateLimitedBody {
                        status_code: 429,
                        status: "NOT ALLOWED",
                        retry_after: retry_after_seconds.to_string(),
                    }),
                )
                    .into_response();
                if let Ok(value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
                    response.headers_mut().insert("Retry-After", value);
                }
                response
            }
        }
    }
}

/// `GET /rate-limit-stats` success body is the domain type directly; its
/// `camelCase` serde rename already matches the documented shape.
pub struct StatsResponse(pub RateLimitStats);

impl IntoResponse for StatsResponse {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// `PUT /users/:userId/rate-limits` success body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideWriteResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub updated: OverrideFields,
}

impl IntoResponse for OverrideWriteResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
