//! Configuration module with business-specific sub-modules
//!
//! - `database` - MySQL connection pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Policy table for send-code, verify and lockout
//! - `server` - HTTP server configuration
//! - `session` - Session cookie contract
//! - `sms` - Verification provider selection and credentials
//! - `store` - Attempt store backend and sweeping
//! - `verification` - Counting semantics and enumeration policy

pub mod database;
pub mod environment;
pub mod rate_limit;
pub mod server;
pub mod session;
pub mod sms;
pub mod store;
pub mod verification;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::{LockoutConfig, PolicyConfig, RateLimitConfig, ScopedLimits};
pub use server::ServerConfig;
pub use session::SessionConfig;
pub use sms::{SmsConfig, SmsProviderKind};
pub use store::{StoreBackend, StoreConfig, SweepStrategy};
pub use verification::{CountingMode, VerificationConfig};

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration value: {field}")]
    Missing { field: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (used by the mysql store backend)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Attempt store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Verification flow configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// SMS provider configuration
    #[serde(default)]
    pub sms: SmsConfig,

    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            database: DatabaseConfig::new("mysql://localhost:3306/storkwatch_dev"),
            store: StoreConfig::default(),
            rate_limit: RateLimitConfig::development(),
            verification: VerificationConfig::default(),
            sms: SmsConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            database: DatabaseConfig::new("mysql://prod-db:3306/storkwatch").with_max_connections(50),
            store: StoreConfig::mysql(),
            rate_limit: RateLimitConfig::production(),
            verification: VerificationConfig::default(),
            sms: SmsConfig {
                provider: SmsProviderKind::Twilio,
                ..Default::default()
            },
            session: SessionConfig::production(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Preset for an environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Validate all sub-configurations
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate_limit.validate()?;
        self.store.validate()?;
        self.verification.validate()?;
        self.sms.validate()?;

        if self.environment.is_production() && !self.session.secure {
            return Err(ConfigError::Invalid {
                field: "session.secure".to_string(),
                reason: "must be true in production".to_string(),
            });
        }
        if self.session.max_age_seconds <= 0
            || self.session.max_age_seconds > session::MAX_SESSION_AGE_SECONDS
        {
            return Err(ConfigError::Invalid {
                field: "session.max_age_seconds".to_string(),
                reason: format!("must be between 1 and {}", session::MAX_SESSION_AGE_SECONDS),
            });
        }

        // Retention sweeps must not delete attempts that still hold a lock
        let horizon = self.rate_limit.lockout.horizon_seconds();
        if self.store.attempt_retention_seconds < horizon {
            return Err(ConfigError::Invalid {
                field: "store.attempt_retention_seconds".to_string(),
                reason: format!(
                    "must be at least lockout_seconds + window_seconds ({})",
                    horizon
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_config_is_valid() {
        let config = AppConfig::development();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.sms.provider, SmsProviderKind::Dev);
    }

    #[test]
    fn test_production_requires_provider_credentials() {
        let config = AppConfig::production();
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing {
                field: "sms.account_sid".to_string()
            })
        );
    }

    #[test]
    fn test_production_with_credentials_is_valid() {
        let mut config = AppConfig::production();
        config.sms.account_sid = "AC123".to_string();
        config.sms.auth_token = "token".to_string();
        config.sms.verify_service_sid = "VA123".to_string();

        assert!(config.validate().is_ok());
        assert!(config.session.secure);
        assert_eq!(config.store.backend, StoreBackend::Mysql);
    }

    #[test]
    fn test_production_rejects_insecure_cookie() {
        let mut config = AppConfig::production();
        config.sms.account_sid = "AC123".to_string();
        config.sms.auth_token = "token".to_string();
        config.sms.verify_service_sid = "VA123".to_string();
        config.session.secure = false;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "session.secure"
        ));
    }

    #[test]
    fn test_retention_shorter_than_lockout_horizon_rejected() {
        let mut config = AppConfig::development();
        config.store.attempt_retention_seconds = 60;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "store.attempt_retention_seconds"
        ));

        config.store.attempt_retention_seconds = 0;
        assert!(config.validate().is_err());

        // Exactly lockout + window is enough
        config.store.attempt_retention_seconds = config.rate_limit.lockout.horizon_seconds();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_age_capped_at_thirty_days() {
        let mut config = AppConfig::development();
        config.session.max_age_seconds = session::MAX_SESSION_AGE_SECONDS + 1;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "session.max_age_seconds"
        ));

        config.session.max_age_seconds = session::MAX_SESSION_AGE_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_staging_preset() {
        let config = AppConfig::for_environment(Environment::Staging);
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.store.backend, StoreBackend::Mysql);
    }
}
