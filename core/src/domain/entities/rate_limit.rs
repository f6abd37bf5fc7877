//! Fixed-window rate limiting entities.
//!
//! A [`RateLimitKey`] addresses one counter, a [`RateLimitPolicy`] bounds it
//! and a [`RateLimitWindow`] holds its state. [`RateLimitWindow::admit`] is
//! the only place the counting rule lives; every store applies it under its
//! own per-key exclusion.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ClientOrigin, PhoneNumber};
use crate::errors::DomainError;

/// Action a counter is guarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitPurpose {
    /// Login code requests
    SendCode,
    /// Code checks, counted in fixed-window mode
    Verify,
    /// Registration code requests
    RegisterSend,
    /// Approved registration checks
    RegisterVerifySuccess,
    /// Code checks admitted under the trailing-window lockout
    CheckSlot,
}

impl RateLimitPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitPurpose::SendCode => "send-code",
            RateLimitPurpose::Verify => "verify",
            RateLimitPurpose::RegisterSend => "register-send",
            RateLimitPurpose::RegisterVerifySuccess => "register-verify-success",
            RateLimitPurpose::CheckSlot => "check-slot",
        }
    }
}

impl fmt::Display for RateLimitPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the identifier of a key is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitScope {
    Ip,
    Phone,
}

impl RateLimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::Ip => "ip",
            RateLimitScope::Phone => "phone",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key addressing one rate-limit counter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub purpose: RateLimitPurpose,
    pub scope: RateLimitScope,
    pub identifier: String,
}

impl RateLimitKey {
    pub fn new(
        purpose: RateLimitPurpose,
        scope: RateLimitScope,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            purpose,
            scope,
            identifier: identifier.into(),
        }
    }

    /// Phone-scoped key over the canonical E.164 form
    pub fn for_phone(purpose: RateLimitPurpose, phone: &PhoneNumber) -> Self {
        Self::new(purpose, RateLimitScope::Phone, phone.as_str())
    }

    /// Origin-scoped key; degraded origins are bucketed by their fallback id
    pub fn for_origin(purpose: RateLimitPurpose, origin: &ClientOrigin) -> Self {
        Self::new(purpose, RateLimitScope::Ip, origin.key())
    }

    /// Storage form `{purpose}:{scope}:{identifier}`
    pub fn storage_key(&self) -> String {
        format!("{}:{}:{}", self.purpose, self.scope, self.identifier)
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.purpose, self.scope, self.identifier)
    }
}

/// Maximum admits per fixed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_attempts: u32,
    window: Duration,
}

impl RateLimitPolicy {
    /// Create a policy; `max_attempts` must be at least 1 and `window` positive
    pub fn new(max_attempts: u32, window: Duration) -> Result<Self, DomainError> {
        if max_attempts == 0 {
            return Err(DomainError::Validation {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        if window <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "window must be positive".to_string(),
            });
        }
        Ok(Self {
            max_attempts,
            window,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl TryFrom<&sw_shared::PolicyConfig> for RateLimitPolicy {
    type Error = DomainError;

    fn try_from(config: &sw_shared::PolicyConfig) -> Result<Self, Self::Error> {
        let seconds = i64::try_from(config.window_seconds).map_err(|_| DomainError::Validation {
            message: format!("window_seconds out of range: {}", config.window_seconds),
        })?;
        Self::new(config.max_attempts, Duration::seconds(seconds))
    }
}

/// Counter state for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitWindow {
    pub count: u32,
    pub window_start: DateTime<Utc>,
    pub window_expires_at: DateTime<Utc>,
}

impl RateLimitWindow {
    /// An already-expired empty window. The first `admit` on it opens a fresh
    /// window, so stores can insert it unconditionally before locking.
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_start: now,
            window_expires_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_expires_at
    }

    /// At least one full window past expiry. Only stale windows may be swept.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let length = self.window_expires_at - self.window_start;
        now >= self.window_expires_at + length
    }

    /// Check-and-increment.
    ///
    /// - expired (or placeholder): reset to `count = 1` anchored at `now`, admit
    /// - at the cap: deny without counting
    /// - otherwise: count and admit
    pub fn admit(&mut self, policy: &RateLimitPolicy, now: DateTime<Utc>) -> RateLimitDecision {
        let limit = policy.max_attempts();

        if self.is_expired(now) {
            *self = Self {
                count: 1,
                window_start: now,
                window_expires_at: now + policy.window(),
            };
            return RateLimitDecision {
                allowed: true,
                remaining: limit - 1,
                reset_at: self.window_expires_at,
                limit,
            };
        }

        if self.count >= limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: self.window_expires_at,
                limit,
            };
        }

        self.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: limit - self.count,
            reset_at: self.window_expires_at,
            limit,
        }
    }
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    pub limit: u32,
}

impl RateLimitDecision {
    /// Denial used when the store cannot answer
    pub fn fail_closed(policy: &RateLimitPolicy, now: DateTime<Utc>) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_at: now + policy.window(),
            limit: policy.max_attempts(),
        }
    }

    /// Seconds until `reset_at`, rounded up and never below 1
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> u64 {
        retry_after_seconds(self.reset_at, now)
    }
}

/// Seconds from `now` until `reset_at`, rounded up and never below 1
pub fn retry_after_seconds(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (reset_at - now).num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    let seconds = (millis as u64).div_ceil(1000);
    seconds.max(1)
}
