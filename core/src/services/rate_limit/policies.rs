//! Policy table built from configuration

use sw_shared::config::rate_limit::ScopedLimits;
use sw_shared::RateLimitConfig;

use crate::domain::entities::rate_limit::{RateLimitPolicy, RateLimitPurpose, RateLimitScope};
use crate::errors::{DomainError, DomainResult};

/// Origin and phone policies evaluated together for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopedPolicy {
    pub per_ip: RateLimitPolicy,
    pub per_phone: RateLimitPolicy,
}

impl ScopedPolicy {
    fn from_limits(name: &str, limits: &ScopedLimits) -> DomainResult<Self> {
        Ok(Self {
            per_ip: policy(name, "per_ip", &limits.per_ip)?,
            per_phone: policy(name, "per_phone", &limits.per_phone)?,
        })
    }

    pub fn for_scope(&self, scope: RateLimitScope) -> &RateLimitPolicy {
        match scope {
            RateLimitScope::Ip => &self.per_ip,
            RateLimitScope::Phone => &self.per_phone,
        }
    }
}

/// Every rate-limit policy the verification flows use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicies {
    pub send_code: ScopedPolicy,
    pub register_send: ScopedPolicy,
    pub verify: ScopedPolicy,
    /// Phone-scoped only
    pub register_verify_success: RateLimitPolicy,
    /// Derived from the lockout threshold and counting window
    pub check_slot: ScopedPolicy,
}

impl RateLimitPolicies {
    pub fn from_config(config: &RateLimitConfig) -> DomainResult<Self> {
        Ok(Self {
            send_code: ScopedPolicy::from_limits("send_code", &config.send_code)?,
            register_send: ScopedPolicy::from_limits("register_send", &config.register_send)?,
            verify: ScopedPolicy::from_limits("verify", &config.verify)?,
            register_verify_success: policy(
                "register_verify_success",
                "per_phone",
                &config.register_verify_success,
            )?,
            check_slot: ScopedPolicy {
                per_ip: policy("lockout", "check_slot", &config.lockout.check_slot())?,
                per_phone: policy("lockout", "check_slot", &config.lockout.check_slot())?,
            },
        })
    }

    /// Policy for a (purpose, scope) pair.
    /// `register-verify-success` has a single policy used for either scope.
    pub fn policy(&self, purpose: RateLimitPurpose, scope: RateLimitScope) -> &RateLimitPolicy {
        match purpose {
            RateLimitPurpose::SendCode => self.send_code.for_scope(scope),
            RateLimitPurpose::RegisterSend => self.register_send.for_scope(scope),
            RateLimitPurpose::Verify => self.verify.for_scope(scope),
            RateLimitPurpose::RegisterVerifySuccess => &self.register_verify_success,
            RateLimitPurpose::CheckSlot => self.check_slot.for_scope(scope),
        }
    }
}

fn policy(
    name: &str,
    scope: &str,
    config: &sw_shared::PolicyConfig,
) -> DomainResult<RateLimitPolicy> {
    RateLimitPolicy::try_from(config).map_err(|e| DomainError::Validation {
        message: format!("rate_limit.{}.{}: {}", name, scope, e),
    })
}
