//! Attempt store configuration
//!
//! Selects which backing strategy holds rate-limit windows and verification
//! attempts, and how stale entries are swept.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Backing strategy for rate-limit windows and the attempt log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local maps; state is lost on restart
    #[default]
    Memory,
    /// MySQL tables shared by every process pointing at the same database
    Mysql,
}

/// How expired in-memory windows are evicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepStrategy {
    /// Sweep inline on a small fraction of checks
    #[default]
    Probabilistic,
    /// Sweep only from the background sweeper task
    Interval,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Backing strategy, fixed at process start
    #[serde(default)]
    pub backend: StoreBackend,

    /// Eviction strategy for in-memory windows
    #[serde(default)]
    pub sweep_strategy: SweepStrategy,

    /// Fraction of checks that trigger an inline sweep
    #[serde(default = "default_sweep_probability")]
    pub sweep_probability: f64,

    /// Interval of the background sweeper in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// How long verification attempts are retained, in seconds
    #[serde(default = "default_attempt_retention")]
    pub attempt_retention_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            sweep_strategy: SweepStrategy::default(),
            sweep_probability: default_sweep_probability(),
            sweep_interval_seconds: default_sweep_interval(),
            attempt_retention_seconds: default_attempt_retention(),
        }
    }
}

impl StoreConfig {
    /// Durable configuration
    pub fn mysql() -> Self {
        Self {
            backend: StoreBackend::Mysql,
            sweep_strategy: SweepStrategy::Interval,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sweep_probability > 0.0 && self.sweep_probability <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "store.sweep_probability".to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
        if self.sweep_interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "store.sweep_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_sweep_probability() -> f64 {
    0.01
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_attempt_retention() -> u64 {
    24 * 60 * 60
}
