//! The row shape as stored by the user store, and its translation into the
//! domain `User` type.

use chrono::{DateTime, Utc};
use ratelimit_core::{Override, User};
use uuid::Uuid;

/// A user row exactly as it is persisted: three independently nullable
/// override columns. This is the only place those three columns
/// are allowed to exist separately — everywhere else in this workspace an
/// override is either fully present or absent.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub tier: String,
    pub override_limit: Option<i32>,
    pub override_window_seconds: Option<i32>,
    pub override_expiry: Option<DateTime<Utc>>,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
    #[allow(dead_code)]
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    /// Collapse the three raw columns into a single `Option<Override>`: only
    /// when all three are present. A partial override (one or two columns
    /// set) becomes `None` here; whether a fully-present override is
    /// *active* (`expiry > now`) is decided later by the limit resolver,
    /// not at this boundary.
    fn from(row: UserRow) -> Self {
        let override_ = match (
            row.override_limit,
            row.override_window_seconds,
            row.override_expiry,
        ) {
            (Some(limit), Some(window_seconds), Some(expiry)) => Some(Override {
                limit: limit.max(0) as u32,
                window_seconds: window_seconds.max(0) as u32,
                expiry,
            }),
            _ => None,
        };
        User {
            id: row.id,
            tier: row.tier,
            override_,
        }
    }
}
