//! Stats projector: the non-mutating sibling of the decision engine.

use std::sync::Arc;

use ratelimit_cache::{counter_key, window_start, CounterStore};
use ratelimit_core::{Clock, RateLimitStats, Result, TierPolicy, User};

use crate::resolver::resolve_limit;

/// Reads the current count and TTL for a user's bucket without mutating
/// either.
pub struct StatsProjector {
    counter_store: Arc<dyn CounterStore>,
    tier_policy: Arc<TierPolicy>,
    clock: Arc<dyn Clock>,
}

impl StatsProjector {
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

    pub async fn read(&self, user: &User) -> Result<RateLimitStats> {
        let now = self.clock.now();
        let resolved = resolve_limit(user, &self.tier_policy, now)?;

        let now_seconds = now.timestamp();
        let start = window_start(now_seconds, resolved.window_seconds);
        let key = counter_key(user.id, start);

        // Absent or unparseable values are treated as 0; `get` already
        // fails with StoreError on a genuinely non-numeric reply, so by the
        // time we're here `None` means "no entry yet".
        let current_count = self.counter_store.get(&key).await?.unwrap_or(0).max(0) as u64;
        // Forwarded raw, sentinels and all — unlike the decision engine's
        // `ttl < 0` fallback, this is a read-only projection and the
        // sentinel itself is part of the documented contract.
        let seconds_until_reset = self.counter_store.ttl(&key).await?;

        Ok(RateLimitStats {
            id: user.id,
            tier: user.tier.clone(),
            limit: resolved.limit,
            window_seconds: resolved.window_seconds,
            current_count,
            seconds_until_reset,
            override_active: resolved.override_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratelimit_cache::MemoryCounterStore;
    use ratelimit_core::{FixedClock, Override, TierLimits};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn policy() -> TierPolicy {
        let mut tiers = HashMap::new();
        tiers.insert(
            "free".to_string(),
            TierLimits {
                requests: 10,
                window_seconds: 60,
            },
        );
        TierPolicy::new(tiers)
    }

    #[tokio::test]
    async fn reads_zero_count_before_any_check() {
        let clock = FixedClock::new(chrono::Utc::now());
        let store = Arc::new(MemoryCounterStore::new());
        let projector = StatsProjector::new(store, Arc::new(policy()), Arc::new(clock));
        let user = User {
            id: Uuid::new_v4(),
            tier: "free".to_string(),
            override_: None,
        };
        let stats = projector.read(&user).await.unwrap();
        assert_eq!(stats.current_count, 0);
        assert_eq!(stats.limit, 10);
        assert_eq!(stats.seconds_until_reset, -2);
        assert!(!stats.override_active);
    }

    #[tokio::test]
    async fn reflects_increments_made_through_the_same_store() {
        let clock = FixedClock::new(chrono::Utc::now());
        let store: Arc<dyn ratelimit_cache::CounterStore> = Arc::new(MemoryCounterStore::new());
        let user = User {
            id: Uuid::new_v4(),
            tier: "free".to_string(),
            override_: Some(Override {
                limit: 2,
                window_seconds: 30,
                expiry: chrono::Utc::now() + chrono::Duration::seconds(300),
            }),
        };
        let key = ratelimit_cache::counter_key(
            user.id,
            ratelimit_cache::window_start(clock.now().timestamp(), 30),
        );
        store.incr_and_expire(&key, 30).await.unwrap();
        store.incr_and_expire(&key, 30).await.unwrap();
        store.incr_and_expire(&key, 30).await.unwrap();

        let projector = StatsProjector::new(store, Arc::new(policy()), Arc::new(clock));
        let stats = projector.read(&user).await.unwrap();
        assert_eq!(stats.current_count, 3);
        assert_eq!(stats.limit, 2);
        assert_eq!(stats.window_seconds, 30);
        assert!(stats.override_active);
        assert!((1..=30).contains(&stats.seconds_until_reset));
    }
}
