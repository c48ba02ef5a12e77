//! Shared domain types, configuration and error handling for the rate
//! limiter. Every other crate in this workspace depends on this one and
//! none of its siblings.

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, RedisConfig, ServerConfig, SupabaseConfig, TierPolicy};
pub use domain::{
    Decision, Override, OverrideFields, OverridePatch, RateLimitStats, ResolvedLimit,
    TierLimits, User,
};
pub use error::{Error, Result};

/// Crate version, surfaced on `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
