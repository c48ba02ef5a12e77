//! Decision engine: orchestrates the resolver and the counter store.

use std::sync::Arc;

use ratelimit_cache::{counter_key, window_start, CounterStore};
use ratelimit_core::{Clock, Decision, Result, TierPolicy, User};
use tracing::debug;

use crate::resolver::resolve_limit;

/// The decision engine. Takes its capabilities — counter store, config,
/// clock — as explicit constructor parameters rather than reaching for
/// ambient context, per the capability-injection design note.
pub struct DecisionEngine {
    counter_store: Arc<dyn CounterStore>,
    tier_policy: Arc<TierPolicy>,
    clock: Arc<dyn Clock>,
}

impl DecisionEngine {
    pub fn new(
        counter_store: Arc<dyn CounterStore>,
        tier_policy: Arc<TierPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            counter_store,
            tier_policy,
            clock,
        }
    }

    /// Run the full decision algorithm for one user: read the clock once,
    /// resolve the effective limit, atomically increment the bucket, and
    /// classify the result.
    pub async fn check(&self, user: &User) -> Result<Decision> {
        let now = self.clock.now();
        let resolved = resolve_limit(user, &self.tier_policy, now)?;

        let now_seconds = now.timestamp();
        let start = window_start(now_seconds, resolved.window_seconds);
        let key = counter_key(user.id, start);

        let count = self
            .counter_store
            .incr_and_expire(&key, resolved.window_seconds)
            .await?;

        if count <= resolved.limit as i64 {
            debug!(user_id = %user.id, %key, count, limit = resolved.limit, "request allowed");
            return Ok(Decision::Allowed);
        }

        // The request that produced count == limit + 1 is the first denied
        // request; the increment already happened and stands regardless of
        // whether the caller later cancels.
        let ttl = self.counter_store.ttl(&key).await?;
        let retry_after_seconds = if ttl >= 0 {
            ttl as u64
        } else {
            // The key was lost between the increment and this read; fall
            // back to the full window rather than treat it as an error.
            resolved.window_seconds as u64
        };

        debug!(
            user_id = %user.id,
            %key,
            count,
            limit = resolved.limit,
            retry_after_seconds,
            "request rate limited"
        );
        Ok(Decision::RateLimited {
            retry_after_seconds,
        })
    }
}
