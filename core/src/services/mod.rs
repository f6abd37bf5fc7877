//! Business services containing domain logic and use cases.

pub mod lockout;
pub mod rate_limit;
pub mod sweeper;
pub mod verification;

// Re-export commonly used types
pub use lockout::{LockoutGuard, LockoutPolicy, LockoutStatus};
pub use rate_limit::{RateLimitPolicies, RateLimiter, ScopedPolicy};
pub use sweeper::{SweepResult, Sweeper, SweeperConfig, SweeperHandle};
pub use verification::{
    CodeCheck, CoordinatorConfig, SendCodeResult, SessionTracker, VerificationCoordinator,
    VerificationProvider, VerifyCodeResult,
};
