//! Configuration for the verification coordinator

use chrono::Duration;
use sw_shared::{CountingMode, VerificationConfig};

/// Configuration for the verification coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Lockout guard (trailing window) or verify policies (fixed window)
    pub counting_mode: CountingMode,
    /// Distinguish "no account" from "wrong code" in login responses
    pub reveal_missing_account: bool,
    /// Lifetime of tracked session state
    pub session_ttl: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for CoordinatorConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            counting_mode: config.counting_mode,
            reveal_missing_account: config.reveal_missing_account,
            session_ttl: Duration::seconds(config.session_ttl_seconds as i64),
        }
    }
}
