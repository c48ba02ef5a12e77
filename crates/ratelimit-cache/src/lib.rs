//! Counter-store client for the rate limiter.
//!
//! Exposes exactly the capability set the decision engine and stats
//! projector need — `incr_and_expire`, `ttl`, `get` — never a general
//! cache API.

pub mod backend;
pub mod key;
pub mod memory;

pub use backend::{CounterStore, RedisCounterStore};
pub use key::{counter_key, window_start};
pub use memory::MemoryCounterStore;
