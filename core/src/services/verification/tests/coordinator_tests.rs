//! Unit tests for the verification coordinator

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use sw_shared::{CountingMode, RateLimitConfig, VerificationConfig};

use crate::clock::{Clock, ManualClock};
use crate::domain::entities::rate_limit::RateLimitScope;
use crate::domain::value_objects::{ClientOrigin, VerificationPurpose, VerificationState};
use crate::errors::{AuthError, ProviderError};
use crate::repositories::{MockAttemptLog, MockRateLimitStore, MockUserRepository};
use crate::services::verification::VerificationCoordinator;

use super::mocks::{MockProvider, MOCK_CODE};

const PHONE: &str = "(515) 555-1234";
const E164: &str = "+15155551234";

type Coordinator =
    VerificationCoordinator<MockProvider, MockRateLimitStore, MockAttemptLog, MockUserRepository>;

struct Harness {
    coordinator: Coordinator,
    provider: Arc<MockProvider>,
    store: Arc<MockRateLimitStore>,
    attempts: Arc<MockAttemptLog>,
    users: Arc<MockUserRepository>,
    clock: Arc<ManualClock>,
}

fn harness_with(verification: VerificationConfig) -> Harness {
    let provider = Arc::new(MockProvider::new());
    let store = Arc::new(MockRateLimitStore::new());
    let attempts = Arc::new(MockAttemptLog::new());
    let users = Arc::new(MockUserRepository::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 4, 20, 14, 0, 0).unwrap(),
    ));

    let coordinator = VerificationCoordinator::from_config(
        provider.clone(),
        store.clone(),
        attempts.clone(),
        users.clone(),
        &RateLimitConfig::default(),
        &verification,
        clock.clone(),
    )
    .unwrap();

    Harness {
        coordinator,
        provider,
        store,
        attempts,
        users,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(VerificationConfig::default())
}

fn origin() -> ClientOrigin {
    ClientOrigin::from_ip("203.0.113.10".parse().unwrap())
}

#[tokio::test]
async fn test_login_request_code_for_known_phone() {
    let h = harness();
    h.users.add_user(E164);

    let result = h
        .coordinator
        .request_code(PHONE, &origin(), VerificationPurpose::Login)
        .await
        .unwrap();

    assert!(result.delivered);
    assert_eq!(result.phone.as_str(), E164);
    assert_eq!(h.provider.sent_count(), 1);
    assert_eq!(
        h.coordinator
            .session_state(PHONE, VerificationPurpose::Login)
            .await
            .unwrap(),
        VerificationState::CodeSent
    );
}

#[tokio::test]
async fn test_invalid_phone_fails_before_any_side_effect() {
    let h = harness();

    let result = h
        .coordinator
        .request_code("+44 7911 123456", &origin(), VerificationPurpose::Registration)
        .await;

    assert!(matches!(result, Err(AuthError::InvalidPhoneFormat { .. })));
    assert_eq!(h.store.check_count(), 0);
    assert_eq!(h.provider.sent_count(), 0);
}

#[tokio::test]
async fn test_unknown_login_phone_is_concealed_by_default() {
    let h = harness();

    let result = h
        .coordinator
        .request_code(PHONE, &origin(), VerificationPurpose::Login)
        .await
        .unwrap();

    assert!(!result.delivered);
    assert_eq!(h.provider.sent_count(), 0);
    // The slot is still spent, so probing unknown numbers is rate limited too
    assert_eq!(h.store.check_count(), 2);
}

#[tokio::test]
async fn test_unknown_login_phone_revealed_when_configured() {
    let h = harness_with(VerificationConfig {
        reveal_missing_account: true,
        ..Default::default()
    });

    let result = h
        .coordinator
        .request_code(PHONE, &origin(), VerificationPurpose::Login)
        .await;

    assert_eq!(result.unwrap_err(), AuthError::NotFound);
}

#[tokio::test]
async fn test_registration_send_limited_by_phone() {
    let h = harness();

    for i in 0..3 {
        let origin = ClientOrigin::from_ip(format!("198.51.100.{}", i + 1).parse().unwrap());
        h.coordinator
            .request_code(PHONE, &origin, VerificationPurpose::Registration)
            .await
            .unwrap();
    }

    let result = h
        .coordinator
        .request_code(PHONE, &origin(), VerificationPurpose::Registration)
        .await;
    match result {
        Err(AuthError::RateLimited { scope, reset_at }) => {
            assert_eq!(scope, RateLimitScope::Phone);
            assert_eq!(reset_at, h.clock.now() + Duration::minutes(5));
        }
        other => panic!("Expected phone rate limit, got {:?}", other),
    }
    assert_eq!(h.provider.sent_count(), 3);
}

#[tokio::test]
async fn test_phone_formatting_variants_share_send_limit() {
    let h = harness();
    let variants = [
        "+15155551234",
        "+1 515 555 1234",
        "+1 (515) 555-1234",
        "+1-515-555-1234",
    ];

    let mut results = Vec::new();
    for (i, phone) in variants.iter().enumerate() {
        let origin = ClientOrigin::from_ip(format!("198.51.100.{}", i + 1).parse().unwrap());
        results.push(
            h.coordinator
                .request_code(phone, &origin, VerificationPurpose::Registration)
                .await,
        );
    }

    assert!(results[..3].iter().all(|r| r.is_ok()));
    assert!(matches!(
        results[3],
        Err(AuthError::RateLimited {
            scope: RateLimitScope::Phone,
            ..
        })
    ));
    assert_eq!(h.provider.sent_count(), 3);
    assert!(h.provider.sent.lock().unwrap().iter().all(|p| p == E164));
}

#[tokio::test]
async fn test_provider_outage_still_spends_slot() {
    let h = harness();
    h.provider.fail_with(ProviderError::Unavailable {
        message: "timeout".to_string(),
    });

    for _ in 0..3 {
        let result = h
            .coordinator
            .request_code(PHONE, &origin(), VerificationPurpose::Registration)
            .await;
        assert_eq!(result.unwrap_err(), AuthError::ProviderUnavailable);
    }

    let result = h
        .coordinator
        .request_code(PHONE, &origin(), VerificationPurpose::Registration)
        .await;
    assert!(matches!(result, Err(AuthError::RateLimited { .. })));
}

#[tokio::test]
async fn test_provider_rejection_maps_to_provider_error() {
    let h = harness();
    h.provider.fail_with(ProviderError::Rejected {
        status: 400,
        message: "invalid parameter".to_string(),
    });

    let result = h
        .coordinator
        .request_code(PHONE, &origin(), VerificationPurpose::Registration)
        .await;
    assert_eq!(result.unwrap_err(), AuthError::ProviderError);
}

#[tokio::test]
async fn test_login_check_returns_subject() {
    let h = harness();
    let subject = h.users.add_user(E164);
    h.coordinator
        .request_code(PHONE, &origin(), VerificationPurpose::Login)
        .await
        .unwrap();

    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await
        .unwrap();

    assert_eq!(result.subject_id, Some(subject));
    assert_eq!(result.verified_at, h.clock.now());

    let attempts = h.attempts.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].success);
    assert_eq!(attempts[0].ip_address.as_deref(), Some("203.0.113.10"));
    assert_eq!(
        h.coordinator
            .session_state(E164, VerificationPurpose::Login)
            .await
            .unwrap(),
        VerificationState::Verified
    );
}

#[tokio::test]
async fn test_wrong_code_recorded_and_rejected() {
    let h = harness();
    h.users.add_user(E164);
    h.provider.issue(E164);

    let result = h
        .coordinator
        .check_code(PHONE, "000000", &origin(), VerificationPurpose::Login)
        .await;

    assert_eq!(result.unwrap_err(), AuthError::InvalidCode);
    let attempts = h.attempts.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(!attempts[0].success);
}

#[tokio::test]
async fn test_malformed_code_rejected_before_provider() {
    let h = harness();

    let result = h
        .coordinator
        .check_code(PHONE, "12", &origin(), VerificationPurpose::Login)
        .await;

    assert_eq!(
        result.unwrap_err(),
        AuthError::InvalidInput {
            field: "verificationCode".to_string()
        }
    );
    assert_eq!(h.provider.check_count(), 0);
}

#[tokio::test]
async fn test_five_failures_lock_then_release_after_lockout() {
    let h = harness();
    h.users.add_user(E164);
    h.provider.issue(E164);

    for _ in 0..5 {
        let result = h
            .coordinator
            .check_code(PHONE, "999999", &origin(), VerificationPurpose::Login)
            .await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCode);
        h.clock.advance(Duration::minutes(1));
    }

    // Sixth attempt is refused even with the right code
    let sixth_at = h.clock.now();
    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;
    let reset_at = match result {
        Err(AuthError::RateLimited { scope, reset_at }) => {
            assert_eq!(scope, RateLimitScope::Phone);
            reset_at
        }
        other => panic!("Expected lockout, got {:?}", other),
    };
    assert_eq!(h.provider.check_count(), 5);
    // The refused attempt is recorded and pushes the lock forward
    assert_eq!(h.attempts.attempts().len(), 6);
    assert_eq!(reset_at, sixth_at + Duration::minutes(30));

    h.clock.set(reset_at);
    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;
    assert!(result.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_guesses_cannot_outrun_the_lockout() {
    let h = Arc::new(harness());
    h.users.add_user(E164);
    h.provider.issue(E164);
    h.provider.delay_checks(std::time::Duration::from_millis(20));

    let mut handles = Vec::new();
    for i in 0..50 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            let origin = ClientOrigin::from_ip(format!("198.51.100.{}", i + 1).parse().unwrap());
            h.coordinator
                .check_code(PHONE, "999999", &origin, VerificationPurpose::Login)
                .await
        }));
    }

    let mut denied = 0;
    let mut limited = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Err(AuthError::InvalidCode) => denied += 1,
            Err(AuthError::RateLimited { .. }) => limited += 1,
            other => panic!("Unexpected result {:?}", other),
        }
    }

    assert_eq!(h.provider.check_count(), 5);
    assert_eq!(denied, 5);
    assert_eq!(limited, 45);
    // Every guess is accounted for, so the phone stays locked
    assert_eq!(h.attempts.attempts().len(), 50);
    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;
    assert!(matches!(result, Err(AuthError::RateLimited { .. })));
}

#[tokio::test]
async fn test_check_slot_denial_is_recorded() {
    let h = harness();
    h.users.add_user(E164);
    h.provider.fail_with(ProviderError::Unavailable {
        message: "timeout".to_string(),
    });

    // Provider outages leave no attempt behind but still use check slots
    for _ in 0..5 {
        let result = h
            .coordinator
            .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
            .await;
        assert_eq!(result.unwrap_err(), AuthError::ProviderUnavailable);
    }
    assert!(h.attempts.attempts().is_empty());

    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;
    match result {
        Err(AuthError::RateLimited { reset_at, .. }) => {
            assert_eq!(reset_at, h.clock.now() + Duration::minutes(15));
        }
        other => panic!("Expected check slot denial, got {:?}", other),
    }
    let attempts = h.attempts.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(!attempts[0].success);
}

#[tokio::test]
async fn test_lock_lifts_thirty_minutes_after_last_attempt() {
    let h = harness();
    h.users.add_user(E164);
    h.provider.issue(E164);

    for _ in 0..5 {
        let _ = h
            .coordinator
            .check_code(PHONE, "999999", &origin(), VerificationPurpose::Login)
            .await;
    }
    let last_attempt = h.clock.now();

    h.clock.set(last_attempt + Duration::minutes(30));
    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_attempt_log_outage_fails_check() {
    let h = harness();
    h.users.add_user(E164);
    h.provider.issue(E164);
    h.attempts.set_unavailable(true);

    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;

    assert_eq!(result.unwrap_err(), AuthError::StoreUnavailable);
}

#[tokio::test]
async fn test_rate_limit_store_outage_denies_send() {
    let h = harness();
    h.store.set_unavailable(true);

    let result = h
        .coordinator
        .request_code(PHONE, &origin(), VerificationPurpose::Registration)
        .await;

    assert!(matches!(result, Err(AuthError::RateLimited { .. })));
    assert_eq!(h.provider.sent_count(), 0);
}

#[tokio::test]
async fn test_unknown_login_phone_check_looks_like_wrong_code() {
    let h = harness();
    h.provider.issue(E164);

    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;

    assert_eq!(result.unwrap_err(), AuthError::InvalidCode);
}

#[tokio::test]
async fn test_unknown_login_phone_check_revealed_when_configured() {
    let h = harness_with(VerificationConfig {
        reveal_missing_account: true,
        ..Default::default()
    });
    h.provider.issue(E164);

    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;

    assert_eq!(result.unwrap_err(), AuthError::NotFound);
}

#[tokio::test]
async fn test_registration_check_applies_success_limit() {
    let h = harness();
    h.provider.issue(E164);

    for _ in 0..5 {
        let result = h
            .coordinator
            .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Registration)
            .await
            .unwrap();
        assert_eq!(result.subject_id, None);
        h.clock.advance(Duration::minutes(4));
    }

    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Registration)
        .await;
    assert!(matches!(
        result,
        Err(AuthError::RateLimited {
            scope: RateLimitScope::Phone,
            ..
        })
    ));
}

#[tokio::test]
async fn test_fixed_window_mode_uses_verify_policies() {
    let h = harness_with(VerificationConfig {
        counting_mode: CountingMode::FixedWindow,
        ..Default::default()
    });
    h.users.add_user(E164);
    h.provider.issue(E164);

    for _ in 0..5 {
        let result = h
            .coordinator
            .check_code(PHONE, "999999", &origin(), VerificationPurpose::Login)
            .await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCode);
    }

    let result = h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await;
    match result {
        Err(AuthError::RateLimited { reset_at, .. }) => {
            assert_eq!(reset_at, h.clock.now() + Duration::minutes(15));
        }
        other => panic!("Expected verify rate limit, got {:?}", other),
    }
    // Attempts are recorded in fixed mode too
    assert_eq!(h.attempts.attempts().len(), 5);

    h.clock.advance(Duration::minutes(15));
    assert!(h
        .coordinator
        .check_code(PHONE, MOCK_CODE, &origin(), VerificationPurpose::Login)
        .await
        .is_ok());
}
