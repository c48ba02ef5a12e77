//! Core domain types: user records, tier policy, overrides and decisions.
//!
//! These types carry no I/O. They are shared by the engine, the database
//! adapter and the HTTP layer so that all three agree on shape without any
//! of them depending on the others' crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fully-specified override: all three fields present. Whether it is
/// *active* additionally depends on `expiry` versus the wall clock, decided
/// by the limit resolver, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub limit: u32,
    pub window_seconds: u32,
    pub expiry: DateTime<Utc>,
}

/// A user record as read from the user store. The three raw nullable
/// override columns are collapsed into a single `Option<Override>` at the
/// user-store boundary: present only when all three columns are non-null.
/// A partial override (one or two columns set) is translated to `None`
/// here, per the design note that a recurring foot-gun is treating these
/// three columns as independently meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tier: String,
    pub override_: Option<Override>,
}

/// The tier → (requests, window) mapping. Read-only after process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    pub requests: u32,
    pub window_seconds: u32,
}

/// The resolved effective limit for a user at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLimit {
    pub limit: u32,
    pub window_seconds: u32,
    pub override_active: bool,
}

/// The output of the decision engine. `RateLimited` is a successful
/// decision, not an error — it must never be modeled as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    RateLimited { retry_after_seconds: u64 },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// A point-in-time, non-mutating projection of a user's bucket, returned by
/// the stats projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStats {
    pub id: Uuid,
    pub tier: String,
    pub limit: u32,
    pub window_seconds: u32,
    pub current_count: u64,
    /// Raw TTL from the counter store, sentinels included: `-1` (no expiry
    /// set) and `-2` (key absent) are forwarded unchanged, per the
    /// deliberate asymmetry with the decision engine's `ttl < 0` fallback.
    pub seconds_until_reset: i64,
    pub override_active: bool,
}

/// A partial patch to a user's override columns. `None` means "leave this
/// field untouched"; this is distinct from the stored value being null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverridePatch {
    pub override_limit: Option<u32>,
    pub override_window_seconds: Option<u32>,
    pub override_expiry: Option<DateTime<Utc>>,
}

impl OverridePatch {
    pub fn is_empty(&self) -> bool {
        self.override_limit.is_none()
            && self.override_window_seconds.is_none()
            && self.override_expiry.is_none()
    }
}

/// The post-update trio, as returned by the override writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideFields {
    pub override_limit: Option<u32>,
    pub override_window_seconds: Option<u32>,
    pub override_expiry: Option<DateTime<Utc>>,
}
