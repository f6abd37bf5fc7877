//! Verification coordinator
//!
//! Orchestrates code requests and code checks: phone normalization, origin
//! and phone rate limits, lockouts, provider calls and attempt accounting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sw_shared::{CountingMode, RateLimitConfig, VerificationConfig};
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::domain::entities::rate_limit::RateLimitPurpose;
use crate::domain::entities::VerificationAttempt;
use crate::domain::value_objects::{
    ClientOrigin, PhoneNumber, VerificationCode, VerificationPurpose, VerificationState,
};
use crate::errors::{AuthError, DomainResult, StoreError};
use crate::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use crate::services::lockout::{LockoutGuard, LockoutPolicy, LockoutStatus};
use crate::services::rate_limit::{RateLimitPolicies, RateLimiter};

use super::config::CoordinatorConfig;
use super::provider::{CodeCheck, VerificationProvider};
use super::session::SessionTracker;
use super::types::{SendCodeResult, VerifyCodeResult};

/// Verification coordinator for login and registration flows
pub struct VerificationCoordinator<P, S, A, U>
where
    P: VerificationProvider,
    S: RateLimitStore,
    A: AttemptLogRepository,
    U: UserRepository,
{
    provider: Arc<P>,
    limiter: RateLimiter<S>,
    lockout: LockoutGuard<A>,
    attempts: Arc<A>,
    users: Arc<U>,
    sessions: Arc<SessionTracker>,
    config: CoordinatorConfig,
    clock: Arc<dyn Clock>,
}

impl<P, S, A, U> VerificationCoordinator<P, S, A, U>
where
    P: VerificationProvider,
    S: RateLimitStore,
    A: AttemptLogRepository,
    U: UserRepository,
{
    /// Create a new coordinator
    ///
    /// # Arguments
    ///
    /// * `provider` - Delivers and checks codes
    /// * `store` - Rate-limit window store
    /// * `attempts` - Verification attempt log
    /// * `users` - Account lookup by phone
    /// * `policies` - Rate-limit policy table
    /// * `lockout_policy` - Trailing-window lockout policy
    /// * `config` - Counting mode and enumeration policy
    /// * `clock` - Time source for every window and timestamp
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<P>,
        store: Arc<S>,
        attempts: Arc<A>,
        users: Arc<U>,
        policies: RateLimitPolicies,
        lockout_policy: LockoutPolicy,
        config: CoordinatorConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            limiter: RateLimiter::new(store, policies, clock.clone()),
            lockout: LockoutGuard::new(attempts.clone(), lockout_policy, clock.clone()),
            attempts,
            users,
            sessions: Arc::new(SessionTracker::new(config.session_ttl)),
            config,
            clock,
        }
    }

    /// Build a coordinator from application configuration
    pub fn from_config(
        provider: Arc<P>,
        store: Arc<S>,
        attempts: Arc<A>,
        users: Arc<U>,
        rate_limit: &RateLimitConfig,
        verification: &VerificationConfig,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        Ok(Self::new(
            provider,
            store,
            attempts,
            users,
            RateLimitPolicies::from_config(rate_limit)?,
            LockoutPolicy::from_config(&rate_limit.lockout)?,
            CoordinatorConfig::from(verification),
            clock,
        ))
    }

    /// Current time on the coordinator's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Session tracker, shared with the sweeper
    pub fn sessions(&self) -> Arc<SessionTracker> {
        self.sessions.clone()
    }

    /// Request a code for `raw_phone`.
    ///
    /// Origin and phone budgets are spent before the provider is called, so
    /// provider failures still count. For a login with no matching account
    /// the provider is skipped and, unless account existence is revealed,
    /// the caller sees the same success as for a real account.
    pub async fn request_code(
        &self,
        raw_phone: &str,
        origin: &ClientOrigin,
        purpose: VerificationPurpose,
    ) -> Result<SendCodeResult, AuthError> {
        let phone = PhoneNumber::parse(raw_phone)?;

        self.limiter
            .check_origin_and_phone(purpose.send_limit(), origin, &phone)
            .await?;

        if purpose == VerificationPurpose::Login {
            let subject = self
                .users
                .find_subject_by_phone(&phone)
                .await
                .map_err(|e| store_failure("user_lookup", e))?;

            if subject.is_none() {
                if self.config.reveal_missing_account {
                    return Err(AuthError::NotFound);
                }
                info!(
                    phone = %phone.masked(),
                    event = "code_request_unknown_phone",
                    "Login code requested for unknown phone, not sending"
                );
                return Ok(SendCodeResult {
                    phone,
                    purpose,
                    delivered: false,
                });
            }
        }

        self.provider.send_code(&phone).await.map_err(|e| {
            warn!(
                phone = %phone.masked(),
                error = %e,
                event = "code_send_failed",
                "Verification provider failed to send code"
            );
            AuthError::from(e)
        })?;

        self.sessions
            .transition(&phone, purpose, VerificationState::CodeSent, self.clock.now())
            .await;

        info!(
            phone = %phone.masked(),
            purpose = %purpose,
            event = "code_sent",
            "Verification code sent"
        );

        Ok(SendCodeResult {
            phone,
            purpose,
            delivered: true,
        })
    }

    /// Check a submitted code.
    ///
    /// Every provider verdict is recorded in the attempt log before the
    /// result is returned. If the attempt cannot be recorded the check
    /// fails with [`AuthError::StoreUnavailable`].
    ///
    /// In trailing-window mode a check must also claim a check slot before
    /// the provider is called, so concurrent guesses cannot all pass the
    /// lockout before any of them is recorded.
    pub async fn check_code(
        &self,
        raw_phone: &str,
        raw_code: &str,
        origin: &ClientOrigin,
        purpose: VerificationPurpose,
    ) -> Result<VerifyCodeResult, AuthError> {
        let phone = PhoneNumber::parse(raw_phone)?;
        let code = VerificationCode::parse(raw_code)?;

        match self.config.counting_mode {
            CountingMode::TrailingWindow => {
                self.enforce_lockout(&phone, origin).await?;
                self.claim_check_slot(&phone, origin).await?;
            }
            CountingMode::FixedWindow => {
                self.limiter
                    .check_origin_and_phone(RateLimitPurpose::Verify, origin, &phone)
                    .await?
            }
        }

        let verdict = self.provider.check_code(&phone, &code).await.map_err(|e| {
            warn!(
                phone = %phone.masked(),
                error = %e,
                event = "code_check_failed",
                "Verification provider failed to check code"
            );
            AuthError::from(e)
        })?;

        let approved = verdict == CodeCheck::Approved;
        let now = self.clock.now();
        self.record_attempt(&phone, origin, approved, now).await?;

        if !approved {
            info!(
                phone = %phone.masked(),
                purpose = %purpose,
                event = "code_denied",
                "Verification code denied"
            );
            return Err(AuthError::InvalidCode);
        }

        self.sessions
            .transition(&phone, purpose, VerificationState::Verified, now)
            .await;

        let subject_id = match purpose {
            VerificationPurpose::Registration => {
                self.limiter
                    .check_phone(RateLimitPurpose::RegisterVerifySuccess, &phone)
                    .await?;
                None
            }
            VerificationPurpose::Login => {
                let subject = self
                    .users
                    .find_subject_by_phone(&phone)
                    .await
                    .map_err(|e| store_failure("user_lookup", e))?;
                match subject {
                    Some(subject) => Some(subject),
                    None if self.config.reveal_missing_account => return Err(AuthError::NotFound),
                    None => return Err(AuthError::InvalidCode),
                }
            }
        };

        info!(
            phone = %phone.masked(),
            purpose = %purpose,
            event = "code_verified",
            "Verification code approved"
        );

        Ok(VerifyCodeResult {
            phone,
            subject_id,
            verified_at: now,
        })
    }

    /// Tracked state for a phone and purpose
    pub async fn session_state(
        &self,
        raw_phone: &str,
        purpose: VerificationPurpose,
    ) -> Result<VerificationState, AuthError> {
        let phone = PhoneNumber::parse(raw_phone)?;
        Ok(self.sessions.state(&phone, purpose, self.clock.now()).await)
    }

    /// Deny locked identifiers. The denied attempt is still recorded, which
    /// extends the lock; `until` already accounts for it.
    async fn enforce_lockout(
        &self,
        phone: &PhoneNumber,
        origin: &ClientOrigin,
    ) -> Result<(), AuthError> {
        let status = self
            .lockout
            .evaluate(phone, origin)
            .await
            .map_err(|e| store_failure("lockout_evaluate", e))?;

        let LockoutStatus::Locked { scope, until } = status else {
            return Ok(());
        };

        self.record_attempt(phone, origin, false, self.clock.now())
            .await?;

        warn!(
            phone = %phone.masked(),
            scope = %scope,
            reset_at = %until,
            event = "verification_locked",
            "Verification attempt rejected, identifier locked"
        );
        Err(AuthError::RateLimited {
            scope,
            reset_at: until,
        })
    }

    /// Atomically take one of the lockout's `max_attempts` per window
    /// before the provider sees the code. A denied claim is recorded as a
    /// failed attempt.
    async fn claim_check_slot(
        &self,
        phone: &PhoneNumber,
        origin: &ClientOrigin,
    ) -> Result<(), AuthError> {
        let mut claimed = Ok(());
        if origin.ip_address().is_some() {
            claimed = self
                .limiter
                .check_origin(RateLimitPurpose::CheckSlot, origin)
                .await;
        }
        if claimed.is_ok() {
            claimed = self
                .limiter
                .check_phone(RateLimitPurpose::CheckSlot, phone)
                .await;
        }

        if let Err(AuthError::RateLimited { .. }) = &claimed {
            self.record_attempt(phone, origin, false, self.clock.now())
                .await?;
        }
        claimed
    }

    async fn record_attempt(
        &self,
        phone: &PhoneNumber,
        origin: &ClientOrigin,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let attempt = VerificationAttempt::new(phone, origin, success, now);
        self.attempts
            .record(&attempt)
            .await
            .map_err(|e| store_failure("attempt_record", e))
    }
}

fn store_failure(operation: &str, error: StoreError) -> AuthError {
    error!(
        operation = operation,
        error = %error,
        event = "store_unavailable",
        "Attempt store failure, denying request"
    );
    AuthError::from(error)
}
