//! In-process stores
//!
//! State lives in the process and is lost on restart. Suitable for a single
//! service instance and for tests.

pub mod attempt_log;
pub mod rate_limit_store;
pub mod user_repository;


pub use attempt_log::InMemoryAttemptLog;
pub use rate_limit_store::{InMemoryRateLimitStore, SweepMode};
pub use user_repository::InMemoryUserRepository;
