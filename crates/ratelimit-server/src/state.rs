//! Application state management.

use std::sync::Arc;

use ratelimit_cache::CounterStore;
use ratelimit_core::{AppConfig, Clock, SystemClock, TierPolicy};
use ratelimit_database::{OverrideWriter, UserStore};
use ratelimit_engine::{DecisionEngine, StatsProjector};

/// Application state shared across all requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_store: Arc<dyn UserStore>,
    pub override_writer: Arc<dyn OverrideWriter>,
    pub engine: Arc<DecisionEngine>,
    pub stats: Arc<StatsProjector>,
    pub metrics: Arc<crate::metrics::Metrics>,
}

impl AppState {
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn user_store(&self) -> &Arc<dyn UserStore> {
        &self.user_store
    }

    pub fn override_writer(&self) -> &Arc<dyn OverrideWriter> {
        &self.override_writer
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn stats(&self) -> &StatsProjector {
        &self.stats
    }
}

/// Builder for [`AppState`]. Assembling the decision engine and stats
/// projector requires the counter store and tier policy, so the builder
/// takes those two directly rather than a pre-built engine: it is the one
/// place in the process that wires capabilities together.
pub struct AppStateBuilder {
    config: Option<AppConfig>,
    user_store: Option<Arc<dyn UserStore>>,
    override_writer: Option<Arc<dyn OverrideWriter>>,
    counter_store: Option<Arc<dyn CounterStore>>,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Arc<crate::metrics::Metrics>>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            user_store: None,
            override_writer: None,
            counter_store: None,
            clock: None,
            metrics: None,
        }
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn user_store(mut self, user_store: Arc<dyn UserStore>) -> Self {
        self.user_store = Some(user_store);
        self
    }

    pub fn override_writer(mut self, override_writer: Arc<dyn OverrideWriter>) -> Self {
        self.override_writer = Some(override_writer);
        self
    }

    pub fn counter_store(mut self, counter_store: Arc<dyn CounterStore>) -> Self {
        self.counter_store = Some(counter_store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn metrics(mut self, metrics: Arc<crate::metrics::Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<AppState, &'static str> {
        let config = Arc::new(self.config.ok_or("config is required")?);
        let counter_store = self.counter_store.ok_or("counter_store is required")?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let tier_policy: Arc<TierPolicy> = Arc::new(config.tier_policy.clone());

        let engine = Arc::new(DecisionEngine::new(
            counter_store.clone(),
            tier_policy.clone(),
            clock.clone(),
        ));
        let stats = Arc::new(StatsProjector::new(counter_store, tier_policy, clock));

        Ok(AppState {
            config,
            user_store: self.user_store.ok_or("user_store is required")?,
            override_writer: self.override_writer.ok_or("override_writer is required")?,
            engine,
            stats,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
