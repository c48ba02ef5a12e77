//! Request handlers for the three business endpoints plus liveness and
//! metrics.

use std::time::Instant;

use axum::extract::State;
use ratelimit_core::{Error as CoreError, OverridePatch};
use tracing::{debug, info, instrument};

use crate::error::HttpResult;
use crate::extract::{UserIdPath, UserIdQuery, ValidatedJson};
use crate::response::{CheckResponse, OverrideWriteResponse, StatsResponse};
use crate::state::AppState;

/// `GET /api/check?userId=...`
///
/// A missing or malformed `userId` never reaches the user store; an
/// unknown `userId` surfaces as a 404.
#[instrument(skip(state), fields(user_id = %user_id.0))]
pub async fn check_handler(
    State(state): State<AppState>,
    user_id: UserIdQuery,
) -> HttpResult<CheckResponse> {
    let user = state.user_store().find_by_id(user_id.0).await?;
    let user = user.ok_or_else(|| CoreError::not_found(user_id.0.to_string()))?;

    let started = Instant::now();
    let decision = state.engine().check(&user).await?;
    state
        .metrics
        .record_decision(&decision, started.elapsed().as_secs_f64());

    debug!(allowed = decision.is_allowed(), "decision computed");
    Ok(CheckResponse(decision))
}

/// `GET /rate-limit-stats?userId=...`
#[instrument(skip(state), fields(user_id = %user_id.0))]
pub async fn stats_handler(
    State(state): State<AppState>,
    user_id: UserIdQuery,
) -> HttpResult<StatsResponse> {
    let user = state.user_store().find_by_id(user_id.0).await?;
    let user = user.ok_or_else(|| CoreError::not_found(user_id.0.to_string()))?;

    let stats = state.stats().read(&user).await?;
    Ok(StatsResponse(stats))
}

/// `PUT /users/:userId/rate-limits`
///
/// Unknown JSON fields in the body are rejected by `OverridePatch`'s
/// `deny_unknown_fields`; `ValidatedJson` turns that (and any other body
/// parse failure) into a 400, matching the documented error set, rather
/// than Axum's default 422.
#[instrument(skip(state, patch), fields(user_id = %user_id.0))]
pub async fn override_handler(
    State(state): State<AppState>,
    user_id: UserIdPath,
    ValidatedJson(patch): ValidatedJson<OverridePatch>,
) -> HttpResult<OverrideWriteResponse> {
    let updated = state.override_writer().write(user_id.0, patch).await?;
    info!("override updated");

    Ok(OverrideWriteResponse {
        success: true,
        user_id: user_id.0,
        updated,
    })
}

/// `GET /health` — process liveness only. Does not probe Postgres or
/// Redis; a dependency outage should not flap the load balancer's view
/// of this process.
pub async fn health_handler() -> &'static str {
    "ok"
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.render()
}
