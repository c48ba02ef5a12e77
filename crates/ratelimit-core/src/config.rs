//! Configuration for the rate limiter, loaded once from process environment
//! variables at startup.
//!
//! Unlike a layered CMS configuration, the external contract here is small
//! and flat enough that a TOML+env `config`-crate setup would add
//! indirection without buying anything; `AppConfig::from_env` reads the
//! handful of variables directly and fails closed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

use crate::domain::TierLimits;
use crate::error::{Error, Result};

/// Top-level process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub supabase: SupabaseConfig,
    pub tier_policy: TierPolicy,
}

/// Server bind configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Graceful shutdown timeout in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Counter-store (Redis) connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: Option<i64>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: None,
        }
    }
}

impl RedisConfig {
    pub fn connection_url(&self) -> String {
        let auth = self
            .password
            .as_ref()
            .map(|p| format!(":{p}@"))
            .unwrap_or_default();
        let db = self.db.unwrap_or(0);
        format!("redis://{auth}{}:{}/{db}", self.host, self.port)
    }
}

/// User-store (Supabase/Postgres) connection configuration. Both fields are
/// required; there is no default for either.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

/// The tier → (requests, window) mapping, read-only for the process
/// lifetime. Replacing it requires a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierPolicy(HashMap<String, TierLimits>);

impl TierPolicy {
    pub fn new(tiers: HashMap<String, TierLimits>) -> Self {
        Self(tiers)
    }

    pub fn get(&self, tier: &str) -> Option<&TierLimits> {
        self.0.get(tier)
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        let mut tiers = HashMap::new();
        tiers.insert(
            "free".to_string(),
            TierLimits {
                requests: 10,
                window_seconds: 60,
            },
        );
        tiers.insert(
            "premium".to_string(),
            TierLimits {
                requests: 1000,
                window_seconds: 60,
            },
        );
        Self(tiers)
    }
}

const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
const ENV_SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
const ENV_REDIS_HOST: &str = "REDIS_HOST";
const ENV_REDIS_PORT: &str = "REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "REDIS_DB";
const ENV_PORT: &str = "PORT";
const ENV_HOST: &str = "HOST";
const ENV_TIER_POLICY_JSON: &str = "TIER_POLICY_JSON";

impl AppConfig {
    /// Load configuration from the process environment. Missing required
    /// variables (`SUPABASE_URL`, the service-role key) are a fatal
    /// `ConfigError`, never silently defaulted.
    pub fn from_env() -> Result<Self> {
        let supabase = SupabaseConfig {
            url: required_var(ENV_SUPABASE_URL)?,
            service_role_key: required_var(ENV_SUPABASE_SERVICE_ROLE_KEY)?,
        };

        let mut redis = RedisConfig::default();
        if let Ok(host) = env::var(ENV_REDIS_HOST) {
            redis.host = host;
        }
        if let Ok(port) = env::var(ENV_REDIS_PORT) {
            let port: u32 = port
                .parse()
                .map_err(|_| Error::config(format!("{ENV_REDIS_PORT} is not a valid integer")))?;
            if port == 0 || port > 65535 {
                return Err(Error::config(format!(
                    "{ENV_REDIS_PORT} must be in 1..65535, got {port}"
                )));
            }
            redis.port = port as u16;
        }
        redis.password = env::var(ENV_REDIS_PASSWORD).ok();
        if let Ok(db) = env::var(ENV_REDIS_DB) {
            redis.db = Some(
                db.parse()
                    .map_err(|_| Error::config(format!("{ENV_REDIS_DB} is not a valid integer")))?,
            );
        }

        let mut server = ServerConfig::default();
        if let Ok(host) = env::var(ENV_HOST) {
            server.host = host;
        }
        if let Ok(port) = env::var(ENV_PORT) {
            server.port = port
                .parse()
                .map_err(|_| Error::config(format!("{ENV_PORT} is not a valid integer")))?;
        }

        let tier_policy = match env::var(ENV_TIER_POLICY_JSON) {
            Ok(raw) => {
                let tiers: HashMap<String, TierLimits> = serde_json::from_str(&raw)
                    .map_err(|e| Error::config(format!("invalid {ENV_TIER_POLICY_JSON}: {e}")))?;
                TierPolicy::new(tiers)
            }
            Err(_) => TierPolicy::default(),
        };

        Ok(Self {
            server,
            redis,
            supabase,
            tier_policy,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::config(format!("missing required environment variable {name}")))
}
