//! Limit resolver: produces the effective `(limit, windowSeconds,
//! overrideActive)` triple for a user at a point in time.

use chrono::{DateTime, Utc};
use ratelimit_core::{Error, ResolvedLimit, Result, TierPolicy, User};

/// Override is active iff all three override fields are present (already
/// guaranteed by the time a `User` reaches this function — see
/// `ratelimit_database::models::UserRow::into`) **and** `expiry > now`. If
/// active, its values are used as-is. Otherwise the tier is looked up in
/// the registry; a missing tier or a non-positive window is a
/// `ConfigError`. Partial overrides were already silently collapsed to
/// `None` at the user-store boundary, so this function never sees them.
pub fn resolve_limit(user: &User, tier_policy: &TierPolicy, now: DateTime<Utc>) -> Result<ResolvedLimit> {
    if let Some(override_) = &user.override_ {
        if override_.expiry > now {
            if override_.window_seconds == 0 {
                return Err(Error::config("Invalid windowSeconds"));
            }
            return Ok(ResolvedLimit {
                limit: override_.limit,
                window_seconds: override_.window_seconds,
                override_active: true,
            });
        }
    }

    let tier = tier_policy
        .get(&user.tier)
        .ok_or_else(|| Error::config(format!("Config missing for tier {}", user.tier)))?;

    if tier.window_seconds == 0 {
        return Err(Error::config("Invalid windowSeconds"));
    }

    Ok(ResolvedLimit {
        limit: tier.requests,
        window_seconds: tier.window_seconds,
        override_active: false,
    })
}
