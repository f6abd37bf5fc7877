//! Rate-limit windows held in a `DashMap`.
//!
//! The map's entry guard locks one shard for the duration of a
//! check-and-increment, so checks for the same key serialize while other
//! keys proceed on other shards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use sw_core::domain::entities::{RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimitWindow};
use sw_core::errors::StoreResult;
use sw_core::repositories::RateLimitStore;
use sw_shared::config::{StoreConfig, SweepStrategy};

/// When stale windows are evicted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepMode {
    /// Sweep inline on roughly this fraction of checks
    Probabilistic(f64),
    /// Only the background sweeper evicts
    Interval,
}

impl SweepMode {
    pub fn from_config(config: &StoreConfig) -> Self {
        match config.sweep_strategy {
            SweepStrategy::Probabilistic => SweepMode::Probabilistic(config.sweep_probability),
            SweepStrategy::Interval => SweepMode::Interval,
        }
    }
}

/// In-memory fixed-window counters
pub struct InMemoryRateLimitStore {
    windows: DashMap<String, RateLimitWindow>,
    sweep_mode: SweepMode,
}

impl InMemoryRateLimitStore {
    pub fn new(sweep_mode: SweepMode) -> Self {
        Self {
            windows: DashMap::new(),
            sweep_mode,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(SweepMode::from_config(config))
    }

    /// Number of tracked windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Remove windows at least one full window past expiry.
    ///
    /// Takes each shard's write lock in turn, so it must never run while
    /// the caller holds an entry guard.
    fn remove_stale(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.windows.retain(|_, window| {
            let keep = !window.is_stale(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    fn should_sweep_inline(&self) -> bool {
        match self.sweep_mode {
            SweepMode::Probabilistic(probability) => rand::random::<f64>() < probability,
            SweepMode::Interval => false,
        }
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &RateLimitKey,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<RateLimitDecision> {
        if self.should_sweep_inline() {
            let removed = self.remove_stale(now);
            if removed > 0 {
                debug!(removed, "Inline sweep removed stale rate-limit windows");
            }
        }

        let mut window = self
            .windows
            .entry(key.storage_key())
            .or_insert_with(|| RateLimitWindow::placeholder(now));
        Ok(window.admit(policy, now))
    }

    async fn get_window(&self, key: &RateLimitKey) -> StoreResult<Option<RateLimitWindow>> {
        Ok(self.windows.get(&key.storage_key()).map(|window| *window))
    }

    async fn reset(&self, key: &RateLimitKey) -> StoreResult<bool> {
        Ok(self.windows.remove(&key.storage_key()).is_some())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        Ok(self.remove_stale(now))
    }
}
