//! Rate limiting policy table
//!
//! Every externally visible action is guarded by two policies, one scoped to
//! the client network origin and one scoped to the phone number.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A single `max_attempts per window` policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Maximum admitted requests inside one window
    pub max_attempts: u32,

    /// Window length in seconds
    pub window_seconds: u64,
}

impl PolicyConfig {
    /// Create a new policy
    pub const fn new(max_attempts: u32, window_seconds: u64) -> Self {
        Self {
            max_attempts,
            window_seconds,
        }
    }

    /// Reject policies that could never admit or never reset
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: format!("{}.max_attempts", name),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.window_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: format!("{}.window_seconds", name),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Origin-scoped and phone-scoped policies for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScopedLimits {
    /// Limit per client network origin
    pub per_ip: PolicyConfig,

    /// Limit per normalized phone number
    pub per_phone: PolicyConfig,
}

/// Trailing-window lockout for code checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LockoutConfig {
    /// Attempts inside the trailing window that trigger a lockout
    pub max_attempts: u32,

    /// Trailing counting window in seconds
    pub window_seconds: u64,

    /// Lockout length in seconds, measured from the most recent attempt
    pub lockout_seconds: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 15 * 60,
            lockout_seconds: 30 * 60,
        }
    }
}

impl LockoutConfig {
    /// Fixed-window budget of code checks per identifier, claimed atomically
    /// before the provider is asked
    pub const fn check_slot(&self) -> PolicyConfig {
        PolicyConfig::new(self.max_attempts, self.window_seconds)
    }

    /// Oldest attempt age, in seconds, that can still hold a lock
    pub const fn horizon_seconds(&self) -> u64 {
        self.lockout_seconds.saturating_add(self.window_seconds)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Login code requests
    #[serde(default = "default_send_code")]
    pub send_code: ScopedLimits,

    /// Registration code requests
    #[serde(default = "default_register_send")]
    pub register_send: ScopedLimits,

    /// Code checks when the fixed-window counting mode is selected
    #[serde(default = "default_verify")]
    pub verify: ScopedLimits,

    /// Approved registration checks per phone
    #[serde(default = "default_register_verify_success")]
    pub register_verify_success: PolicyConfig,

    /// Lockout used by the trailing-window counting mode
    #[serde(default)]
    pub lockout: LockoutConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            send_code: default_send_code(),
            register_send: default_register_send(),
            verify: default_verify(),
            register_verify_success: default_register_verify_success(),
            lockout: LockoutConfig::default(),
        }
    }
}

impl RateLimitConfig {
    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            send_code: ScopedLimits {
                per_ip: PolicyConfig::new(50, 15 * 60),
                per_phone: PolicyConfig::new(10, 60 * 60),
            },
            register_send: ScopedLimits {
                per_ip: PolicyConfig::new(50, 15 * 60),
                per_phone: PolicyConfig::new(10, 5 * 60),
            },
            ..Default::default()
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self::default()
    }

    /// Validate every policy in the table
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.send_code.per_ip.validate("rate_limit.send_code.per_ip")?;
        self.send_code.per_phone.validate("rate_limit.send_code.per_phone")?;
        self.register_send.per_ip.validate("rate_limit.register_send.per_ip")?;
        self.register_send
            .per_phone
            .validate("rate_limit.register_send.per_phone")?;
        self.verify.per_ip.validate("rate_limit.verify.per_ip")?;
        self.verify.per_phone.validate("rate_limit.verify.per_phone")?;
        self.register_verify_success
            .validate("rate_limit.register_verify_success")?;

        PolicyConfig::new(self.lockout.max_attempts, self.lockout.window_seconds)
            .validate("rate_limit.lockout")?;
        if self.lockout.lockout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.lockout.lockout_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_send_code() -> ScopedLimits {
    ScopedLimits {
        per_ip: PolicyConfig::new(5, 15 * 60),
        per_phone: PolicyConfig::new(3, 60 * 60),
    }
}

fn default_register_send() -> ScopedLimits {
    ScopedLimits {
        per_ip: PolicyConfig::new(5, 15 * 60),
        per_phone: PolicyConfig::new(3, 5 * 60),
    }
}

fn default_verify() -> ScopedLimits {
    ScopedLimits {
        per_ip: PolicyConfig::new(5, 15 * 60),
        per_phone: PolicyConfig::new(5, 15 * 60),
    }
}

fn default_register_verify_success() -> PolicyConfig {
    PolicyConfig::new(5, 60 * 60)
}
