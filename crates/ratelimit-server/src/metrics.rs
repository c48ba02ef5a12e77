//! Process metrics, exposed at `GET /metrics` in the Prometheus text
//! format. Scoped to the two numbers an operator actually pages on:
//! decision outcomes and decision latency.

use parking_lot::Mutex;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use ratelimit_core::Decision;

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
struct DecisionLabel {
    decision: String,
}

pub struct Metrics {
    registry: Mutex<Registry>,
    requests_total: Family<DecisionLabel, Counter>,
    decision_latency_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let requests_total = Family::<DecisionLabel, Counter>::default();
        registry.register(
            "rate_limit_requests_total",
            "Total rate limit decisions, by outcome",
            requests_total.clone(),
        );

        let decision_latency_seconds = Histogram::new(exponential_buckets(0.0005, 2.0, 12));
        registry.register(
            "rate_limit_decision_latency_seconds",
            "Time to produce a rate limit decision",
            decision_latency_seconds.clone(),
        );

        Self {
            registry: Mutex::new(registry),
            requests_total,
            decision_latency_seconds,
        }
    }

    /// Records the outcome and latency of a single `check` decision.
    pub fn record_decision(&self, decision: &Decision, elapsed_seconds: f64) {
        let label = DecisionLabel {
            decision: match decision {
                Decision::Allowed => "allowed".to_string(),
                Decision::RateLimited { .. } => "rate_limited".to_string(),
            },
        };
        self.requests_total.get_or_create(&label).inc();
        self.decision_latency_seconds.observe(elapsed_seconds);
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry.lock())
            .expect("encoding an in-memory registry into a String cannot fail");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
