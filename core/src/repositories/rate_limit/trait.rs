//! Rate-limit window store interface.
//!
//! Implementations hold one [`RateLimitWindow`] per storage key and apply
//! [`RateLimitWindow::admit`] under per-key exclusion, so concurrent checks
//! for the same key serialize and different keys proceed independently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::rate_limit::{
    RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimitWindow,
};
use crate::errors::StoreResult;

/// Backing store for fixed-window counters
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Check-and-increment the window for `key` as one atomic step.
    ///
    /// This is the only mutation entry point for counting. Callers must not
    /// increment separately.
    async fn check_and_increment(
        &self,
        key: &RateLimitKey,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<RateLimitDecision>;

    /// Read the current window without counting
    async fn get_window(&self, key: &RateLimitKey) -> StoreResult<Option<RateLimitWindow>>;

    /// Delete the window for `key`. Returns whether one existed.
    async fn reset(&self, key: &RateLimitKey) -> StoreResult<bool>;

    /// Delete windows at least one full window past expiry.
    /// Returns the number removed.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> StoreResult<usize>;
}
