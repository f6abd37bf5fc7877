//! Rate limiter service

use std::sync::Arc;

use tracing::{error, warn};

use crate::clock::Clock;
use crate::domain::entities::rate_limit::{
    RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimitPurpose, RateLimitScope,
};
use crate::domain::value_objects::{ClientOrigin, PhoneNumber};
use crate::errors::{AuthError, StoreResult};
use crate::repositories::RateLimitStore;

use super::policies::RateLimitPolicies;

/// Decides admit/deny for rate-limit keys against a window store.
///
/// Store failures never admit: [`RateLimiter::check`] turns them into a
/// denial lasting one window.
pub struct RateLimiter<S: RateLimitStore> {
    store: Arc<S>,
    policies: RateLimitPolicies,
    clock: Arc<dyn Clock>,
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(store: Arc<S>, policies: RateLimitPolicies, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policies,
            clock,
        }
    }

    pub fn policies(&self) -> &RateLimitPolicies {
        &self.policies
    }

    /// Check-and-increment, surfacing store errors
    pub async fn try_check(
        &self,
        key: &RateLimitKey,
        policy: &RateLimitPolicy,
    ) -> StoreResult<RateLimitDecision> {
        let now = self.clock.now();
        self.store.check_and_increment(key, policy, now).await
    }

    /// Check-and-increment, failing closed
    pub async fn check(&self, key: &RateLimitKey, policy: &RateLimitPolicy) -> RateLimitDecision {
        match self.try_check(key, policy).await {
            Ok(decision) => decision,
            Err(e) => {
                error!(
                    purpose = %key.purpose,
                    scope = %key.scope,
                    error = %e,
                    event = "rate_limit_store_error",
                    "Rate limit store failed, denying request"
                );
                RateLimitDecision::fail_closed(policy, self.clock.now())
            }
        }
    }

    /// Evaluate the origin policy, then the phone policy, for `purpose`.
    ///
    /// The first denial short-circuits, so a denied origin does not spend the
    /// phone's budget.
    pub async fn check_origin_and_phone(
        &self,
        purpose: RateLimitPurpose,
        origin: &ClientOrigin,
        phone: &PhoneNumber,
    ) -> Result<(), AuthError> {
        self.check_origin(purpose, origin).await?;
        self.check_phone(purpose, phone).await
    }

    /// Evaluate only the origin policy for `purpose`
    pub async fn check_origin(
        &self,
        purpose: RateLimitPurpose,
        origin: &ClientOrigin,
    ) -> Result<(), AuthError> {
        let key = RateLimitKey::for_origin(purpose, origin);
        let policy = *self.policies.policy(purpose, RateLimitScope::Ip);
        self.enforce(&key, &policy, origin.key()).await
    }

    /// Evaluate only the phone policy for `purpose`
    pub async fn check_phone(
        &self,
        purpose: RateLimitPurpose,
        phone: &PhoneNumber,
    ) -> Result<(), AuthError> {
        let key = RateLimitKey::for_phone(purpose, phone);
        let policy = *self.policies.policy(purpose, RateLimitScope::Phone);
        self.enforce(&key, &policy, &phone.masked()).await
    }

    /// Delete the window for `key`
    pub async fn reset(&self, key: &RateLimitKey) -> StoreResult<bool> {
        self.store.reset(key).await
    }

    async fn enforce(
        &self,
        key: &RateLimitKey,
        policy: &RateLimitPolicy,
        log_identifier: &str,
    ) -> Result<(), AuthError> {
        let decision = self.check(key, policy).await;
        if decision.allowed {
            return Ok(());
        }

        warn!(
            purpose = %key.purpose,
            scope = %key.scope,
            identifier = %log_identifier,
            reset_at = %decision.reset_at,
            event = "rate_limit_exceeded",
            "Rate limit exceeded"
        );
        Err(AuthError::RateLimited {
            scope: key.scope,
            reset_at: decision.reset_at,
        })
    }
}
