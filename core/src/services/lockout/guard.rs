//! Lockout guard
//!
//! An identifier (phone, or origin IP) is locked when some attempt closed a
//! trailing window holding at least `max_attempts` attempts. The lock lasts
//! `lockout` from that attempt, however long the counting window is. Attempts
//! made while locked are still recorded, so continued guessing keeps pushing
//! the lock forward.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sw_shared::LockoutConfig;

use crate::clock::Clock;
use crate::domain::entities::rate_limit::RateLimitScope;
use crate::domain::entities::AttemptFilter;
use crate::domain::value_objects::{ClientOrigin, PhoneNumber};
use crate::errors::{DomainError, DomainResult, StoreResult};
use crate::repositories::AttemptLogRepository;

/// Threshold, counting window and lock duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub window: Duration,
    pub lockout: Duration,
}

impl LockoutPolicy {
    pub fn from_config(config: &LockoutConfig) -> DomainResult<Self> {
        if config.max_attempts == 0 || config.window_seconds == 0 || config.lockout_seconds == 0 {
            return Err(DomainError::Validation {
                message: "lockout policy values must be greater than zero".to_string(),
            });
        }
        let seconds = |value: u64| {
            i64::try_from(value)
                .map(Duration::seconds)
                .map_err(|_| DomainError::Validation {
                    message: format!("lockout duration out of range: {}", value),
                })
        };
        Ok(Self {
            max_attempts: config.max_attempts,
            window: seconds(config.window_seconds)?,
            lockout: seconds(config.lockout_seconds)?,
        })
    }

    /// End of the lock implied by `newest_first` (sorted, newest first), if
    /// still in force at `now`.
    ///
    /// The newest attempt that closes a full window decides the lock, so the
    /// scan stops at the first one it finds, or once attempts are too old to
    /// hold a lock at all.
    pub fn locked_until(
        &self,
        newest_first: &[DateTime<Utc>],
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let span = self.max_attempts as usize - 1;

        for (index, &at) in newest_first.iter().enumerate() {
            if at + self.lockout <= now {
                return None;
            }
            let oldest = newest_first.get(index + span)?;
            if *oldest >= at - self.window {
                return Some(at + self.lockout);
            }
        }
        None
    }

    /// Rows [`LockoutPolicy::locked_until`] may need to look at.
    ///
    /// Each run of `max_attempts` rows that does not close a window spans
    /// more than one window, so after `ceil(lockout / window)` such runs the
    /// scan is past the lock horizon.
    pub fn scan_limit(&self) -> usize {
        let window = self.window.num_seconds().max(1);
        let runs = (self.lockout.num_seconds() + window - 1) / window;
        let runs = usize::try_from(runs).unwrap_or(usize::MAX);
        (self.max_attempts as usize).saturating_mul(runs.saturating_add(1))
    }

    /// Oldest attempt time that can still matter at `now`
    pub fn horizon(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.lockout - self.window
    }
}

/// Result of a lockout evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    Clear,
    Locked {
        scope: RateLimitScope,
        until: DateTime<Utc>,
    },
}

impl LockoutStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockoutStatus::Locked { .. })
    }
}

/// Evaluates lockouts from the attempt log
pub struct LockoutGuard<A: AttemptLogRepository> {
    attempts: Arc<A>,
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl<A: AttemptLogRepository> LockoutGuard<A> {
    pub fn new(attempts: Arc<A>, policy: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            attempts,
            policy,
            clock,
        }
    }

    /// Check the phone, then the origin IP when the origin has one.
    ///
    /// The attempt being evaluated is counted as if already made at `now`, so
    /// a returned [`LockoutStatus::Locked`] carries the lock end after the
    /// caller records that attempt.
    pub async fn evaluate(
        &self,
        phone: &PhoneNumber,
        origin: &ClientOrigin,
    ) -> StoreResult<LockoutStatus> {
        let now = self.clock.now();

        if let Some(until) = self.locked_until(AttemptFilter::Phone(phone.as_str()), now).await? {
            return Ok(LockoutStatus::Locked {
                scope: RateLimitScope::Phone,
                until,
            });
        }

        if let Some(ip) = origin.ip_address() {
            if let Some(until) = self.locked_until(AttemptFilter::Ip(ip), now).await? {
                return Ok(LockoutStatus::Locked {
                    scope: RateLimitScope::Ip,
                    until,
                });
            }
        }

        Ok(LockoutStatus::Clear)
    }

    async fn locked_until(
        &self,
        filter: AttemptFilter<'_>,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let mut times = self
            .attempts
            .recent_attempt_times(filter, self.policy.horizon(now), self.policy.scan_limit())
            .await?;

        if self.policy.locked_until(&times, now).is_none() {
            return Ok(None);
        }

        // Locked: fold in the attempt about to be recorded, which may extend it
        times.insert(0, now);
        Ok(self.policy.locked_until(&times, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::entities::VerificationAttempt;
    use crate::repositories::MockAttemptLog;
    use chrono::TimeZone;

    fn policy() -> LockoutPolicy {
        LockoutPolicy::from_config(&LockoutConfig::default()).unwrap()
    }

    fn setup() -> (LockoutGuard<MockAttemptLog>, Arc<MockAttemptLog>, Arc<ManualClock>) {
        let log = Arc::new(MockAttemptLog::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap(),
        ));
        let guard = LockoutGuard::new(log.clone(), policy(), clock.clone());
        (guard, log, clock)
    }

    async fn fail(log: &MockAttemptLog, phone: &PhoneNumber, origin: &ClientOrigin, at: DateTime<Utc>) {
        log.record(&VerificationAttempt::new(phone, origin, false, at))
            .await
            .unwrap();
    }

    #[test]
    fn test_default_policy() {
        let policy = policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.window, Duration::minutes(15));
        assert_eq!(policy.lockout, Duration::minutes(30));
    }

    fn newest_first(t0: DateTime<Utc>, minutes: &[i64]) -> Vec<DateTime<Utc>> {
        let mut times: Vec<_> = minutes.iter().map(|m| t0 + Duration::minutes(*m)).collect();
        times.sort_by(|a, b| b.cmp(a));
        times
    }

    #[test]
    fn test_locked_until_ignores_spread_out_attempts() {
        let policy = policy();
        let t0 = Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap();
        let times = newest_first(t0, &[0, 4, 8, 12, 16]);

        // Never five inside one 15 minute window
        assert_eq!(policy.locked_until(&times, t0 + Duration::minutes(17)), None);
    }

    #[test]
    fn test_locked_until_outlasts_counting_window() {
        let policy = policy();
        let t0 = Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap();
        let times = newest_first(t0, &[0, 1, 2, 3, 4]);
        let expected = t0 + Duration::minutes(34);

        assert_eq!(policy.locked_until(&times, t0 + Duration::minutes(20)), Some(expected));
        assert_eq!(policy.locked_until(&times, expected), None);
    }

    #[test]
    fn test_newest_closing_attempt_decides_the_lock() {
        let policy = policy();
        let t0 = Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap();
        // A burst, then sparse retries that each still close a window
        let times = newest_first(t0, &[0, 1, 2, 3, 4, 5, 12, 18]);

        assert_eq!(
            policy.locked_until(&times, t0 + Duration::minutes(20)),
            Some(t0 + Duration::minutes(48))
        );
    }

    #[test]
    fn test_scan_limit_covers_the_horizon() {
        let policy = policy();
        // 30 minute lockout over a 15 minute window: two sparse runs, then one more
        assert_eq!(policy.scan_limit(), 15);

        let t0 = Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap();
        // Dense burst behind a sparse tail
        let mut minutes: Vec<i64> = vec![0; 200];
        minutes.extend([16, 20]);
        let times = newest_first(t0, &minutes);
        let now = t0 + Duration::minutes(22);

        let bounded = &times[..policy.scan_limit()];
        assert_eq!(policy.locked_until(bounded, now), policy.locked_until(&times, now));
        assert_eq!(policy.locked_until(bounded, now), Some(t0 + Duration::minutes(30)));
    }

    #[tokio::test]
    async fn test_five_failures_lock_the_phone() {
        let (guard, log, clock) = setup();
        let phone = PhoneNumber::parse("5155551234").unwrap();
        let origin = ClientOrigin::fallback("abc");

        for _ in 0..4 {
            fail(&log, &phone, &origin, clock.now()).await;
            clock.advance(Duration::minutes(1));
        }
        assert_eq!(guard.evaluate(&phone, &origin).await.unwrap(), LockoutStatus::Clear);

        let last = clock.now();
        fail(&log, &phone, &origin, last).await;

        let status = guard.evaluate(&phone, &origin).await.unwrap();
        assert_eq!(
            status,
            LockoutStatus::Locked {
                scope: RateLimitScope::Phone,
                until: last + Duration::minutes(30),
            }
        );

        clock.set(last + Duration::minutes(20));
        assert!(guard.evaluate(&phone, &origin).await.unwrap().is_locked());

        clock.set(last + Duration::minutes(30));
        assert_eq!(guard.evaluate(&phone, &origin).await.unwrap(), LockoutStatus::Clear);
    }

    #[tokio::test]
    async fn test_attempts_while_locked_extend_the_lock() {
        let (guard, log, clock) = setup();
        let phone = PhoneNumber::parse("5155551234").unwrap();
        let origin = ClientOrigin::fallback("abc");

        for _ in 0..5 {
            fail(&log, &phone, &origin, clock.now()).await;
        }
        clock.advance(Duration::minutes(10));
        let retry = clock.now();
        fail(&log, &phone, &origin, retry).await;

        clock.advance(Duration::minutes(25));
        match guard.evaluate(&phone, &origin).await.unwrap() {
            LockoutStatus::Locked { until, .. } => assert_eq!(until, retry + Duration::minutes(30)),
            LockoutStatus::Clear => panic!("Expected lock to be extended"),
        }
    }

    #[tokio::test]
    async fn test_origin_lock_spans_phones() {
        let (guard, log, clock) = setup();
        let origin = ClientOrigin::from_ip("203.0.113.50".parse().unwrap());

        for i in 0..5 {
            let phone = PhoneNumber::parse(&format!("515555200{}", i)).unwrap();
            fail(&log, &phone, &origin, clock.now()).await;
        }

        let fresh_phone = PhoneNumber::parse("5155559999").unwrap();
        let status = guard.evaluate(&fresh_phone, &origin).await.unwrap();
        assert!(matches!(
            status,
            LockoutStatus::Locked {
                scope: RateLimitScope::Ip,
                ..
            }
        ));

        // Degraded origins are never IP-locked
        let status = guard
            .evaluate(&fresh_phone, &ClientOrigin::fallback("abc"))
            .await
            .unwrap();
        assert_eq!(status, LockoutStatus::Clear);
    }

    #[tokio::test]
    async fn test_log_outage_is_an_error() {
        let (guard, log, _) = setup();
        log.set_unavailable(true);
        let phone = PhoneNumber::parse("5155551234").unwrap();

        assert!(guard
            .evaluate(&phone, &ClientOrigin::fallback("abc"))
            .await
            .is_err());
    }
}
