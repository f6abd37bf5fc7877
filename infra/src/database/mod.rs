//! Database module - MySQL implementations using SQLx
//!
//! This module provides the durable store backend:
//! - Connection pool management and migrations
//! - Rate-limit windows, the verification attempt log and account lookup

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlAttemptLogRepository, MySqlRateLimitStore, MySqlUserRepository};
