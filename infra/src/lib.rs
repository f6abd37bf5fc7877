//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Stork Watch backend.
//! It provides the concrete attempt stores, the verification providers and
//! configuration loading that the core services are wired with.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Memory**: in-process stores backed by `DashMap` and `RwLock`
//! - **Database**: MySQL implementations using SQLx
//! - **SMS**: verification providers (Twilio Verify, development)
//! - **Stores**: backend selection at process start

pub mod config;
pub mod database;
pub mod memory;
pub mod sms;
pub mod stores;

pub use self::config::{load_config, load_config_from};
pub use database::DatabasePool;
pub use memory::{InMemoryAttemptLog, InMemoryRateLimitStore, InMemoryUserRepository, SweepMode};
pub use sms::{DevVerificationProvider, TwilioVerifyProvider};
pub use stores::{
    build_provider, build_stores, AnyAttemptLog, AnyRateLimitStore, AnyUserRepository,
    AnyVerificationProvider, Stores,
};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration was read but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] sw_shared::ConfigError),

    /// SMS provider setup error
    #[error("SMS service error: {0}")]
    Sms(String),
}

