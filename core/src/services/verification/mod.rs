//! Verification flows for SMS-based login and registration
//!
//! This module provides:
//! - The provider port that delivers and checks codes
//! - Per-phone session state tracking
//! - The coordinator that ties normalization, rate limits, lockouts,
//!   provider calls and attempt accounting together

mod config;
mod coordinator;
mod provider;
mod session;
mod types;

#[cfg(test)]
mod tests;

pub use config::CoordinatorConfig;
pub use coordinator::VerificationCoordinator;
pub use provider::{CodeCheck, VerificationProvider};
pub use session::SessionTracker;
pub use types::{SendCodeResult, VerifyCodeResult};
