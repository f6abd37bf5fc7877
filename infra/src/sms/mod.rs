//! Verification providers
//!
//! Implementations of the core `VerificationProvider` port:
//! - Twilio Verify v2 over HTTPS
//! - A development provider that logs codes instead of sending them

pub mod dev;
pub mod twilio_verify;


pub use dev::DevVerificationProvider;
pub use twilio_verify::{TwilioVerifyConfig, TwilioVerifyProvider};
