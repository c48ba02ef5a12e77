//! User-store client: the only part of this workspace that talks to
//! Postgres/Supabase.

pub mod models;
pub mod pool;
pub mod repository;

pub use models::UserRow;
pub use pool::{DatabasePool, PoolConfig};
pub use repository::{OverrideWriter, PgUserStore, UserStore};
