//! Counter key derivation. The counter store owns only the keyspace
//! matching `rate_limit:<uuid>:<int>`; nothing else reads or writes this
//! prefix, so any other system sharing the store must stay out of it.

use uuid::Uuid;

/// Derive the bucket key for a user at a given window start. `window_start`
/// is the floor of `now` to the nearest multiple of `window_seconds`
/// seconds since the epoch.
pub fn counter_key(user_id: Uuid, window_start_seconds: i64) -> String {
    format!("rate_limit:{user_id}:{window_start_seconds}")
}

/// Floor `now_seconds` to the start of its `window_seconds`-wide bucket.
pub fn window_start(now_seconds: i64, window_seconds: u32) -> i64 {
    let window_seconds = window_seconds as i64;
    (now_seconds / window_seconds) * window_seconds
}
