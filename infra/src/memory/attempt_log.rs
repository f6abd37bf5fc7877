//! Append-only attempt log held in memory

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use sw_core::domain::entities::{AttemptFilter, VerificationAttempt};
use sw_core::errors::StoreResult;
use sw_core::repositories::AttemptLogRepository;

/// In-memory verification attempt log
#[derive(Default)]
pub struct InMemoryAttemptLog {
    attempts: RwLock<Vec<VerificationAttempt>>,
}

impl InMemoryAttemptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.attempts.read().await.is_empty()
    }
}

#[async_trait]
impl AttemptLogRepository for InMemoryAttemptLog {
    async fn record(&self, attempt: &VerificationAttempt) -> StoreResult<()> {
        self.attempts.write().await.push(attempt.clone());
        Ok(())
    }

    async fn recent_attempt_times(
        &self,
        filter: AttemptFilter<'_>,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<DateTime<Utc>>> {
        let attempts = self.attempts.read().await;
        let mut times: Vec<DateTime<Utc>> = attempts
            .iter()
            .filter(|attempt| attempt.created_at >= since && filter.matches(attempt))
            .map(|attempt| attempt.created_at)
            .collect();
        times.sort_unstable_by(|a, b| b.cmp(a));
        times.truncate(limit);
        Ok(times)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();
        attempts.retain(|attempt| attempt.created_at >= cutoff);
        Ok(before - attempts.len())
    }
}
