//! Shared utilities and common types for the Stork Watch server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (policy table, stores, provider, session cookie)
//! - Error response structure used by the HTTP layer
//! - Phone masking for logs

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, CountingMode, DatabaseConfig, Environment, LockoutConfig,
    LoggingConfig, PolicyConfig, RateLimitConfig, ServerConfig, SessionConfig, SmsConfig,
    SmsProviderKind, StoreBackend, StoreConfig, SweepStrategy, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::phone;
