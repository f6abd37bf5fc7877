//! Verification flow configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound for tracked session state (one day)
pub const MAX_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

/// How code checks are counted against an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Count attempt rows in a trailing window; lockout extends with each attempt
    #[default]
    TrailingWindow,
    /// Count checks in fixed windows anchored at the first check
    FixedWindow,
}

/// Verification flow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Counting semantics used for code checks
    #[serde(default)]
    pub counting_mode: CountingMode,

    /// Return a distinct "not found" error when no account matches the phone.
    /// When false, missing accounts look like wrong codes to the caller.
    #[serde(default)]
    pub reveal_missing_account: bool,

    /// How long a per-phone session state is tracked, in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            counting_mode: CountingMode::default(),
            reveal_missing_account: false,
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

impl VerificationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl_seconds == 0 || self.session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
            return Err(ConfigError::Invalid {
                field: "verification.session_ttl_seconds".to_string(),
                reason: format!("must be between 1 and {}", MAX_SESSION_TTL_SECONDS),
            });
        }
        Ok(())
    }
}

fn default_session_ttl() -> u64 {
    10 * 60
}
