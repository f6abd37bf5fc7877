//! Fixed-window rate limiting over a pluggable window store
//!
//! - `policies` - the configured policy table, one policy per (purpose, scope)
//! - `limiter` - fail-closed checks, the origin-then-phone pair check and admin reset

mod limiter;
mod policies;


pub use limiter::RateLimiter;
pub use policies::{RateLimitPolicies, ScopedPolicy};
