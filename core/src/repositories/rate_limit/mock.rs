//! Mock implementation of RateLimitStore for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::entities::rate_limit::{
    RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimitWindow,
};
use crate::errors::{StoreError, StoreResult};

use super::trait_::RateLimitStore;

/// Mock rate-limit store with a switchable outage
pub struct MockRateLimitStore {
    windows: Mutex<HashMap<String, RateLimitWindow>>,
    unavailable: AtomicBool,
    checks: AtomicUsize,
}

impl MockRateLimitStore {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
            checks: AtomicUsize::new(0),
        }
    }

    /// Make every call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of check_and_increment calls seen
    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn count_for(&self, storage_key: &str) -> Option<u32> {
        self.windows.lock().unwrap().get(storage_key).map(|w| w.count)
    }

    fn guard(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "mock store offline".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for MockRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &RateLimitKey,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<RateLimitDecision> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.guard()?;
        let mut windows = self.windows.lock().unwrap();
        let window = windows
            .entry(key.storage_key())
            .or_insert_with(|| RateLimitWindow::placeholder(now));
        Ok(window.admit(policy, now))
    }

    async fn get_window(&self, key: &RateLimitKey) -> StoreResult<Option<RateLimitWindow>> {
        self.guard()?;
        Ok(self.windows.lock().unwrap().get(&key.storage_key()).copied())
    }

    async fn reset(&self, key: &RateLimitKey) -> StoreResult<bool> {
        self.guard()?;
        Ok(self.windows.lock().unwrap().remove(&key.storage_key()).is_some())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        self.guard()?;
        let mut windows = self.windows.lock().unwrap();
        let before = windows.len();
        windows.retain(|_, window| !window.is_stale(now));
        Ok(before - windows.len())
    }
}
