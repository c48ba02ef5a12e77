//! User-store protocol: a single query by primary key, and a single update
//! statement patching the override trio.

use async_trait::async_trait;
use chrono::Utc;
use ratelimit_core::{Error, OverrideFields, OverridePatch, Result, User};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::UserRow;

/// Read-only access to user records. The core only ever reads through
/// this trait, except for [`OverrideWriter`], which mutates.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

/// Mutates the override columns on a user record.
#[async_trait]
pub trait OverrideWriter: Send + Sync {
    async fn write(&self, id: Uuid, patch: OverridePatch) -> Result<OverrideFields>;
}

/// Postgres/Supabase-backed implementation of both [`UserStore`] and
/// [`OverrideWriter`], sharing a single connection pool.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, tier, override_limit, override_window_seconds, override_expiry, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::user_store_with_source("failed to find user by id", e))?;

        Ok(row.map(User::from))
    }
}

/// Supplied numeric fields must be positive; there is no cross-field
/// validation — a patch that leaves the override inactive (for instance,
/// only raising the limit while the expiry stays in the past) is legal.
fn validate_patch(patch: &OverridePatch) -> Result<()> {
    if let Some(limit) = patch.override_limit {
        if limit == 0 {
            return Err(Error::bad_request("overrideLimit must be positive"));
        }
    }
    if let Some(window_seconds) = patch.override_window_seconds {
        if window_seconds == 0 {
            return Err(Error::bad_request(
                "overrideWindowSeconds must be positive",
            ));
        }
    }
    Ok(())
}

#[async_trait]
impl OverrideWriter for PgUserStore {
    async fn write(&self, id: Uuid, patch: OverridePatch) -> Result<OverrideFields> {
        validate_patch(&patch)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                override_limit = COALESCE($2, override_limit),
                override_window_seconds = COALESCE($3, override_window_seconds),
                override_expiry = COALESCE($4, override_expiry),
                updated_at = $5
            WHERE id = $1
            RETURNING id, tier, override_limit, override_window_seconds, override_expiry, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.override_limit.map(|v| v as i32))
        .bind(patch.override_window_seconds.map(|v| v as i32))
        .bind(patch.override_expiry)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::user_store_with_source("failed to write override", e))?;

        let row = row.ok_or_else(|| Error::not_found(id.to_string()))?;

        info!(user_id = %id, "override fields updated");

        Ok(OverrideFields {
            override_limit: row.override_limit.map(|v| v.max(0) as u32),
            override_window_seconds: row.override_window_seconds.map(|v| v.max(0) as u32),
            override_expiry: row.override_expiry,
        })
    }
}
