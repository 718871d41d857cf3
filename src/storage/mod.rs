//! # Storage Layer
//!
//! Database pool management, embedded migrations, and the repositories over
//! the user and organization record stores.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use migrations::run_migrations;
pub use pool::{create_pool, get_pool_stats, DbPool, PoolStats};
