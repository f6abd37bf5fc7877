//! Sweeper service for periodic maintenance of the attempt stores
//!
//! Each cycle deletes rate-limit windows at least one window past expiry,
//! attempts older than the retention period and expired session state.
//! The task is owned: [`Sweeper::start`] returns a handle that stops it and
//! waits for the running cycle to finish.

use std::sync::Arc;

use chrono::Duration;
use sw_shared::StoreConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::repositories::{AttemptLogRepository, RateLimitStore};
use crate::services::verification::SessionTracker;

/// Configuration for the sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to run a sweep
    pub interval: std::time::Duration,
    /// How long attempts are kept
    pub attempt_retention: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

impl From<&StoreConfig> for SweeperConfig {
    fn from(config: &StoreConfig) -> Self {
        Self {
            interval: std::time::Duration::from_secs(config.sweep_interval_seconds),
            attempt_retention: Duration::seconds(config.attempt_retention_seconds as i64),
        }
    }
}

/// Result of one sweep cycle
#[derive(Debug, Default)]
pub struct SweepResult {
    pub windows_removed: usize,
    pub attempts_removed: usize,
    pub sessions_removed: usize,
    pub errors: Vec<String>,
}

impl SweepResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_removed(&self) -> usize {
        self.windows_removed + self.attempts_removed + self.sessions_removed
    }
}

/// Periodic sweeper over the stores
pub struct Sweeper<S: RateLimitStore + 'static, A: AttemptLogRepository + 'static> {
    windows: Arc<S>,
    attempts: Arc<A>,
    sessions: Arc<SessionTracker>,
    clock: Arc<dyn Clock>,
    config: SweeperConfig,
}

impl<S: RateLimitStore + 'static, A: AttemptLogRepository + 'static> Sweeper<S, A> {
    pub fn new(
        windows: Arc<S>,
        attempts: Arc<A>,
        sessions: Arc<SessionTracker>,
        clock: Arc<dyn Clock>,
        config: SweeperConfig,
    ) -> Self {
        Self {
            windows,
            attempts,
            sessions,
            clock,
            config,
        }
    }

    /// Run a single sweep cycle. Store failures are collected, not raised,
    /// so one failing store does not stop the others being swept.
    pub async fn run_sweep(&self) -> SweepResult {
        let now = self.clock.now();
        let mut result = SweepResult::default();

        match self.windows.sweep_expired(now).await {
            Ok(count) => result.windows_removed = count,
            Err(e) => {
                error!("Failed to sweep rate limit windows: {}", e);
                result.errors.push(format!("Window sweep error: {}", e));
            }
        }

        match self
            .attempts
            .delete_older_than(now - self.config.attempt_retention)
            .await
        {
            Ok(count) => result.attempts_removed = count,
            Err(e) => {
                error!("Failed to delete old verification attempts: {}", e);
                result.errors.push(format!("Attempt retention error: {}", e));
            }
        }

        result.sessions_removed = self.sessions.purge_expired(now).await;

        debug!(
            windows = result.windows_removed,
            attempts = result.attempts_removed,
            sessions = result.sessions_removed,
            "Sweep completed"
        );
        result
    }

    /// Start the sweeper as a background task
    pub fn start(self: Arc<Self>) -> SweeperHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let interval = self.config.interval;

        let task = tokio::spawn(async move {
            info!(
                "Sweeper started - will run every {} seconds",
                interval.as_secs()
            );

            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let result = self.run_sweep().await;
                        if !result.is_success() {
                            warn!("Sweep completed with errors: {:?}", result.errors);
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Sweeper stopped");
        });

        SweeperHandle { stop_tx, task }
    }
}

/// Stop handle for a running sweeper
pub struct SweeperHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper to stop and wait for it to exit
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Sweeper task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
