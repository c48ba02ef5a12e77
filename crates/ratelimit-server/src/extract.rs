//! Request extractors that enforce the `{error: string}` body shape on
//! rejection, instead of Axum's default plain-text rejection body.
//!
//! The core does not authenticate the caller (a stated Non-goal), so there
//! is no JWT extractor here — only the UUID validation at the edge that
//! the external interface requires.

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::HttpError;

#[derive(Debug, Deserialize)]
struct RawUserIdQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// The `userId` query parameter, validated as a UUID. Invalid or missing
/// input never reaches the user store or counter store — it is rejected
/// before the handler body runs.
pub struct UserIdQuery(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdQuery
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawUserIdQuery>::from_request_parts(parts, state)
            .await
            .map_err(|_| HttpError::bad_request("invalid query parameters"))?;
        let raw = raw
            .user_id
            .ok_or_else(|| HttpError::bad_request("userId is required"))?;
        let id = Uuid::parse_str(&raw)
            .map_err(|_| HttpError::bad_request("userId is not a valid UUID"))?;
        Ok(UserIdQuery(id))
    }
}

/// The `:userId` path parameter, validated as a UUID.
pub struct UserIdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| HttpError::bad_request("missing userId path parameter"))?;
        let id = Uuid::parse_str(&raw)
            .map_err(|_| HttpError::bad_request("userId is not a valid UUID"))?;
        Ok(UserIdPath(id))
    }
}

/// A JSON body that rejects with `HttpError::bad_request` (400) instead of
/// Axum's default `JsonRejection` response (422 for a malformed or
/// unknown-field body), matching the documented error set for the PUT
/// endpoint.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(HttpError::bad_request(describe(rejection))),
        }
    }
}

fn describe(rejection: JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(_) => "request body has an invalid or unknown field".to_string(),
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "request body must have content-type application/json".to_string()
        }
        other => other.to_string(),
    }
}
