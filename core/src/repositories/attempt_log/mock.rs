//! Mock implementation of AttemptLogRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::entities::{AttemptFilter, VerificationAttempt};
use crate::errors::{StoreError, StoreResult};

use super::trait_::AttemptLogRepository;

/// Mock attempt log backed by a vector
pub struct MockAttemptLog {
    attempts: Mutex<Vec<VerificationAttempt>>,
    unavailable: AtomicBool,
}

impl MockAttemptLog {
    pub fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<VerificationAttempt> {
        self.attempts.lock().unwrap().clone()
    }

    fn guard(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "mock attempt log offline".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockAttemptLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttemptLogRepository for MockAttemptLog {
    async fn record(&self, attempt: &VerificationAttempt) -> StoreResult<()> {
        self.guard()?;
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn recent_attempt_times(
        &self,
        filter: AttemptFilter<'_>,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<DateTime<Utc>>> {
        self.guard()?;
        let mut times: Vec<_> = self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.created_at >= since && filter.matches(a))
            .map(|a| a.created_at)
            .collect();
        times.sort_by(|a, b| b.cmp(a));
        times.truncate(limit);
        Ok(times)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        self.guard()?;
        let mut attempts = self.attempts.lock().unwrap();
        let before = attempts.len();
        attempts.retain(|a| a.created_at >= cutoff);
        Ok(before - attempts.len())
    }
}
