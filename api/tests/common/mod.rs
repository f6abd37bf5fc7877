//! Shared fixtures for the HTTP tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web;
use sw_api::AppState;
use sw_core::clock::ManualClock;
use sw_core::domain::entities::{RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimitWindow};
use sw_core::domain::value_objects::{PhoneNumber, VerificationCode};
use sw_core::errors::{ProviderError, StoreError, StoreResult};
use sw_core::repositories::RateLimitStore;
use sw_core::services::{CodeCheck, VerificationCoordinator, VerificationProvider};
use sw_infra::{InMemoryAttemptLog, InMemoryRateLimitStore, InMemoryUserRepository, SweepMode};
use sw_shared::config::{RateLimitConfig, SessionConfig, VerificationConfig};

/// The only code `FixedCodeProvider` approves
pub const VALID_CODE: &str = "123456";

/// Provider that "delivers" a fixed code
#[derive(Default)]
pub struct FixedCodeProvider {
    sends: AtomicUsize,
    failure: Mutex<Option<ProviderError>>,
}

impl FixedCodeProvider {
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, error: ProviderError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    fn failure(&self) -> Option<ProviderError> {
        self.failure.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerificationProvider for FixedCodeProvider {
    async fn send_code(&self, _phone: &PhoneNumber) -> Result<(), ProviderError> {
        if let Some(error) = self.failure() {
            return Err(error);
        }
        self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn check_code(
        &self,
        _phone: &PhoneNumber,
        code: &VerificationCode,
    ) -> Result<CodeCheck, ProviderError> {
        if let Some(error) = self.failure() {
            return Err(error);
        }
        if code.as_str() == VALID_CODE {
            Ok(CodeCheck::Approved)
        } else {
            Ok(CodeCheck::Denied)
        }
    }
}

/// Store whose every call fails
pub struct UnavailableStore;

#[async_trait]
impl RateLimitStore for UnavailableStore {
    async fn check_and_increment(
        &self,
        _key: &RateLimitKey,
        _policy: &RateLimitPolicy,
        _now: DateTime<Utc>,
    ) -> StoreResult<RateLimitDecision> {
        Err(unavailable())
    }

    async fn get_window(&self, _key: &RateLimitKey) -> StoreResult<Option<RateLimitWindow>> {
        Err(unavailable())
    }

    async fn reset(&self, _key: &RateLimitKey) -> StoreResult<bool> {
        Err(unavailable())
    }

    async fn sweep_expired(&self, _now: DateTime<Utc>) -> StoreResult<usize> {
        Err(unavailable())
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable {
        message: "connection refused".to_string(),
    }
}

pub type TestState<S> =
    AppState<FixedCodeProvider, S, InMemoryAttemptLog, InMemoryUserRepository>;

/// Handles a test keeps after building the state
pub struct Fixture<S: RateLimitStore> {
    pub state: web::Data<TestState<S>>,
    pub provider: Arc<FixedCodeProvider>,
    pub users: Arc<InMemoryUserRepository>,
    pub clock: Arc<ManualClock>,
}

pub fn fixture_with_store<S: RateLimitStore + 'static>(
    store: S,
    verification: VerificationConfig,
) -> Fixture<S> {
    let provider = Arc::new(FixedCodeProvider::default());
    let users = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 4, 20, 14, 0, 0).unwrap(),
    ));

    let coordinator = VerificationCoordinator::from_config(
        provider.clone(),
        Arc::new(store),
        Arc::new(InMemoryAttemptLog::new()),
        users.clone(),
        &RateLimitConfig::production(),
        &verification,
        clock.clone(),
    )
    .unwrap();

    let state = web::Data::new(AppState {
        coordinator: Arc::new(coordinator),
        session: SessionConfig::default(),
        database: None,
    });

    Fixture {
        state,
        provider,
        users,
        clock,
    }
}

pub fn fixture() -> Fixture<InMemoryRateLimitStore> {
    fixture_with_store(
        InMemoryRateLimitStore::new(SweepMode::Interval),
        VerificationConfig::default(),
    )
}

pub const MAX_PAYLOAD: usize = 16 * 1024;
