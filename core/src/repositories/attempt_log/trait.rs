//! Verification attempt log interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{AttemptFilter, VerificationAttempt};
use crate::errors::StoreResult;

/// Append-only log of code checks.
///
/// Attempts are never updated. They are removed only by
/// [`AttemptLogRepository::delete_older_than`] during retention sweeps.
#[async_trait]
pub trait AttemptLogRepository: Send + Sync {
    /// Append one attempt
    async fn record(&self, attempt: &VerificationAttempt) -> StoreResult<()>;

    /// Timestamps of matching attempts with `created_at >= since`, newest
    /// first, at most `limit` of them
    async fn recent_attempt_times(
        &self,
        filter: AttemptFilter<'_>,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<DateTime<Utc>>>;

    /// Retention sweep: delete attempts with `created_at < cutoff`
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<usize>;
}
