//! SMS verification provider configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Which verification provider delivers and checks codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProviderKind {
    /// In-process provider that logs codes instead of sending them
    #[default]
    Dev,
    /// Twilio Verify v2
    Twilio,
}

/// SMS provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Provider selection
    #[serde(default)]
    pub provider: SmsProviderKind,

    /// Account SID
    #[serde(default)]
    pub account_sid: String,

    /// Auth token
    #[serde(default)]
    pub auth_token: String,

    /// Verify service SID
    #[serde(default)]
    pub verify_service_sid: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for provider requests in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProviderKind::default(),
            account_sid: String::new(),
            auth_token: String::new(),
            verify_service_sid: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SmsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider == SmsProviderKind::Twilio {
            for (field, value) in [
                ("sms.account_sid", &self.account_sid),
                ("sms.auth_token", &self.auth_token),
                ("sms.verify_service_sid", &self.verify_service_sid),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::Missing {
                        field: field.to_string(),
                    });
                }
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sms.request_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    String::from("https://verify.twilio.com/v2")
}

fn default_request_timeout() -> u64 {
    10
}
