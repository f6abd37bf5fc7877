//! Domain entities representing core business objects.

pub mod rate_limit;
pub mod verification_attempt;


// Re-export commonly used types
pub use rate_limit::{
    RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimitPurpose, RateLimitScope,
    RateLimitWindow, retry_after_seconds,
};
pub use verification_attempt::{AttemptFilter, VerificationAttempt};
