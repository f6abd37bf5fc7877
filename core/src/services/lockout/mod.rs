//! Trailing-window lockout over the verification attempt log

mod guard;

pub use guard::{LockoutGuard, LockoutPolicy, LockoutStatus};
