//! # Stork Watch Core
//!
//! Core business logic and domain layer for the Stork Watch backend.
//! This crate contains the phone verification domain: rate-limit windows,
//! the attempt log, lockout evaluation, the verification coordinator and
//! the repository interfaces that infrastructure implements.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
