//! Configuration loading
//!
//! Layers, later sources overriding earlier ones:
//! 1. the preset for the selected environment
//! 2. an optional `config/{environment}.toml`
//! 3. `APP__`-prefixed environment variables, `__` separating nested keys
//!    (`APP__RATE_LIMIT__SEND_CODE__PER_IP__MAX_ATTEMPTS=10`)
//!
//! The environment is taken from `ENVIRONMENT` or `APP_ENV`.

use std::path::Path;

use ::config::{Config, Environment as EnvSource, File};
use sw_shared::config::{AppConfig, Environment};

use crate::InfrastructureError;

/// Load configuration from `.env`, `config/` and the process environment
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok();
    load_config_from(Environment::from_env(), Path::new("."))
}

/// Load configuration for `environment`, resolving `config/` under `root`
pub fn load_config_from(
    environment: Environment,
    root: &Path,
) -> Result<AppConfig, InfrastructureError> {
    let preset = AppConfig::for_environment(environment);
    let file = root.join(environment.config_file());

    let settings = Config::builder()
        .add_source(Config::try_from(&preset).map_err(config_error)?)
        .add_source(File::with_name(&file.to_string_lossy()).required(false))
        .add_source(
            EnvSource::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(config_error)?;

    let mut config: AppConfig = settings.try_deserialize().map_err(config_error)?;
    // The preset decides the environment, a file cannot relabel it
    config.environment = environment;
    config.validate()?;

    tracing::info!(
        environment = %config.environment,
        store = ?config.store.backend,
        provider = ?config.sms.provider,
        "Configuration loaded"
    );

    Ok(config)
}

fn config_error(e: ::config::ConfigError) -> InfrastructureError {
    InfrastructureError::Config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use sw_shared::config::{CountingMode, StoreBackend};

    fn temp_root(name: &str) -> std::path::PathBuf {
        let root = std::env::temp_dir()
            .join(format!("sw_infra_config_{}_{}", name, std::process::id()));
        fs::create_dir_all(root.join("config")).unwrap();
        root
    }

    #[test]
    fn test_development_preset_without_file() {
        let root = temp_root("preset");
        let config = load_config_from(Environment::Development, &root).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(
            config.rate_limit.send_code.per_phone.max_attempts,
            AppConfig::development().rate_limit.send_code.per_phone.max_attempts
        );
    }

    #[test]
    fn test_file_overrides_preset() {
        let root = temp_root("file");
        fs::write(
            root.join("config/development.toml"),
            r#"
            [verification]
            counting_mode = "fixed_window"
            reveal_missing_account = true

            [rate_limit.send_code.per_ip]
            max_attempts = 9
            window_seconds = 600
            "#,
        )
        .unwrap();

        let config = load_config_from(Environment::Development, &root).unwrap();
        assert_eq!(config.verification.counting_mode, CountingMode::FixedWindow);
        assert!(config.verification.reveal_missing_account);
        assert_eq!(config.rate_limit.send_code.per_ip.max_attempts, 9);
        assert_eq!(config.rate_limit.send_code.per_ip.window_seconds, 600);
        // Untouched keys keep the preset
        assert_eq!(
            config.rate_limit.send_code.per_phone.max_attempts,
            AppConfig::development().rate_limit.send_code.per_phone.max_attempts
        );

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_invalid_file_values_fail_validation() {
        let root = temp_root("invalid");
        fs::write(
            root.join("config/development.toml"),
            r#"
            [rate_limit.verify.per_phone]
            max_attempts = 0
            window_seconds = 900
            "#,
        )
        .unwrap();

        let result = load_config_from(Environment::Development, &root);
        assert!(matches!(result, Err(InfrastructureError::InvalidConfig(_))));

        fs::remove_dir_all(root).ok();
    }
}
