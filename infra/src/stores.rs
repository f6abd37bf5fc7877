//! Store and provider selection
//!
//! The backend is chosen once at process start. Each `Any*` enum implements
//! the matching core trait by delegating to the selected implementation, so
//! the services stay generic over one concrete type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use sw_core::clock::Clock;
use sw_core::domain::entities::{
    AttemptFilter, RateLimitDecision, RateLimitKey, RateLimitPolicy,
    RateLimitWindow, VerificationAttempt,
};
use sw_core::domain::value_objects::{PhoneNumber, SubjectId, VerificationCode};
use sw_core::errors::{ProviderError, StoreResult};
use sw_core::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use sw_core::services::{CodeCheck, VerificationProvider};
use sw_shared::config::{AppConfig, SmsConfig, SmsProviderKind, StoreBackend};

use crate::database::{
    DatabasePool, MySqlAttemptLogRepository, MySqlRateLimitStore, MySqlUserRepository,
};
use crate::memory::{InMemoryAttemptLog, InMemoryRateLimitStore, InMemoryUserRepository};
use crate::sms::{DevVerificationProvider, TwilioVerifyProvider};
use crate::InfrastructureError;

/// Rate-limit window store for the configured backend
pub enum AnyRateLimitStore {
    Memory(InMemoryRateLimitStore),
    Mysql(MySqlRateLimitStore),
}

#[async_trait]
impl RateLimitStore for AnyRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &RateLimitKey,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<RateLimitDecision> {
        match self {
            Self::Memory(store) => store.check_and_increment(key, policy, now).await,
            Self::Mysql(store) => store.check_and_increment(key, policy, now).await,
        }
    }

    async fn get_window(&self, key: &RateLimitKey) -> StoreResult<Option<RateLimitWindow>> {
        match self {
            Self::Memory(store) => store.get_window(key).await,
            Self::Mysql(store) => store.get_window(key).await,
        }
    }

    async fn reset(&self, key: &RateLimitKey) -> StoreResult<bool> {
        match self {
            Self::Memory(store) => store.reset(key).await,
            Self::Mysql(store) => store.reset(key).await,
        }
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        match self {
            Self::Memory(store) => store.sweep_expired(now).await,
            Self::Mysql(store) => store.sweep_expired(now).await,
        }
    }
}

/// Attempt log for the configured backend
pub enum AnyAttemptLog {
    Memory(InMemoryAttemptLog),
    Mysql(MySqlAttemptLogRepository),
}

#[async_trait]
impl AttemptLogRepository for AnyAttemptLog {
    async fn record(&self, attempt: &VerificationAttempt) -> StoreResult<()> {
        match self {
            Self::Memory(log) => log.record(attempt).await,
            Self::Mysql(log) => log.record(attempt).await,
        }
    }

    async fn recent_attempt_times(
        &self,
        filter: AttemptFilter<'_>,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<DateTime<Utc>>> {
        match self {
            Self::Memory(log) => log.recent_attempt_times(filter, since, limit).await,
            Self::Mysql(log) => log.recent_attempt_times(filter, since, limit).await,
        }
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        match self {
            Self::Memory(log) => log.delete_older_than(cutoff).await,
            Self::Mysql(log) => log.delete_older_than(cutoff).await,
        }
    }
}

/// Account lookup for the configured backend
pub enum AnyUserRepository {
    Memory(InMemoryUserRepository),
    Mysql(MySqlUserRepository),
}

#[async_trait]
impl UserRepository for AnyUserRepository {
    async fn find_subject_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<SubjectId>> {
        match self {
            Self::Memory(repo) => repo.find_subject_by_phone(phone).await,
            Self::Mysql(repo) => repo.find_subject_by_phone(phone).await,
        }
    }
}

/// Verification provider for the configured kind
pub enum AnyVerificationProvider {
    Dev(DevVerificationProvider),
    Twilio(TwilioVerifyProvider),
}

#[async_trait]
impl VerificationProvider for AnyVerificationProvider {
    async fn send_code(&self, phone: &PhoneNumber) -> Result<(), ProviderError> {
        match self {
            Self::Dev(provider) => provider.send_code(phone).await,
            Self::Twilio(provider) => provider.send_code(phone).await,
        }
    }

    async fn check_code(
        &self,
        phone: &PhoneNumber,
        code: &VerificationCode,
    ) -> Result<CodeCheck, ProviderError> {
        match self {
            Self::Dev(provider) => provider.check_code(phone, code).await,
            Self::Twilio(provider) => provider.check_code(phone, code).await,
        }
    }
}

/// Stores owned by the running process
pub struct Stores {
    pub rate_limits: Arc<AnyRateLimitStore>,
    pub attempts: Arc<AnyAttemptLog>,
    pub users: Arc<AnyUserRepository>,
    /// Present for the mysql backend
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Fresh in-memory stores
    pub fn in_memory(config: &AppConfig) -> Self {
        Self {
            rate_limits: Arc::new(AnyRateLimitStore::Memory(InMemoryRateLimitStore::from_config(
                &config.store,
            ))),
            attempts: Arc::new(AnyAttemptLog::Memory(InMemoryAttemptLog::new())),
            users: Arc::new(AnyUserRepository::Memory(InMemoryUserRepository::new())),
            pool: None,
        }
    }

    /// MySQL stores sharing one pool
    pub fn mysql(pool: DatabasePool) -> Self {
        let sqlx_pool = pool.get_pool().clone();
        Self {
            rate_limits: Arc::new(AnyRateLimitStore::Mysql(MySqlRateLimitStore::new(
                sqlx_pool.clone(),
            ))),
            attempts: Arc::new(AnyAttemptLog::Mysql(MySqlAttemptLogRepository::new(
                sqlx_pool.clone(),
            ))),
            users: Arc::new(AnyUserRepository::Mysql(MySqlUserRepository::new(sqlx_pool))),
            pool: Some(pool),
        }
    }
}

/// Build the stores selected by `store.backend`
///
/// The mysql backend connects, runs migrations and fails if the database
/// is unreachable.
pub async fn build_stores(config: &AppConfig) -> Result<Stores, InfrastructureError> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!(sweep = ?config.store.sweep_strategy, "Using in-memory stores");
            Ok(Stores::in_memory(config))
        }
        StoreBackend::Mysql => {
            let pool = DatabasePool::new(&config.database).await?;
            pool.run_migrations().await?;
            info!("Using MySQL stores");
            Ok(Stores::mysql(pool))
        }
    }
}

/// Build the provider selected by `sms.provider`
pub fn build_provider(
    config: &SmsConfig,
    clock: Arc<dyn Clock>,
) -> Result<AnyVerificationProvider, InfrastructureError> {
    match config.provider {
        SmsProviderKind::Dev => {
            tracing::warn!("Using development verification provider, codes are logged");
            Ok(AnyVerificationProvider::Dev(DevVerificationProvider::new(clock)))
        }
        SmsProviderKind::Twilio => Ok(AnyVerificationProvider::Twilio(
            TwilioVerifyProvider::from_config(config)?,
        )),
    }
}
