//! Development verification provider
//!
//! Generates 6-digit codes and logs them instead of sending an SMS.
//! Never select this outside development.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use tracing::info;

use sw_core::clock::Clock;
use sw_core::domain::value_objects::{PhoneNumber, VerificationCode};
use sw_core::errors::ProviderError;
use sw_core::services::{CodeCheck, VerificationProvider};

/// Lifetime of an issued code, matching the hosted provider
pub const DEV_CODE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
struct IssuedCode {
    code: String,
    expires_at: DateTime<Utc>,
}

/// In-process provider that logs codes
pub struct DevVerificationProvider {
    codes: DashMap<String, IssuedCode>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl DevVerificationProvider {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            codes: DashMap::new(),
            clock,
            ttl: Duration::minutes(DEV_CODE_TTL_MINUTES),
        }
    }

    fn generate_code() -> String {
        format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
    }

    #[cfg(test)]
    pub(crate) fn issued_code(&self, phone: &PhoneNumber) -> Option<String> {
        self.codes.get(phone.as_str()).map(|issued| issued.code.clone())
    }
}

#[async_trait]
impl VerificationProvider for DevVerificationProvider {
    async fn send_code(&self, phone: &PhoneNumber) -> Result<(), ProviderError> {
        let code = Self::generate_code();
        let expires_at = self.clock.now() + self.ttl;

        info!(
            phone = %phone.masked(),
            code = %code,
            expires_at = %expires_at,
            "Development verification code issued"
        );

        // A new send replaces any pending code
        self.codes.insert(
            phone.as_str().to_string(),
            IssuedCode { code, expires_at },
        );
        Ok(())
    }

    async fn check_code(
        &self,
        phone: &PhoneNumber,
        code: &VerificationCode,
    ) -> Result<CodeCheck, ProviderError> {
        let issued = self.codes.get(phone.as_str()).map(|entry| entry.value().clone());

        let Some(issued) = issued else {
            return Ok(CodeCheck::Denied);
        };

        if self.clock.now() >= issued.expires_at {
            self.codes.remove(phone.as_str());
            return Ok(CodeCheck::Denied);
        }

        if issued.code == code.as_str() {
            // Codes are single use
            self.codes.remove(phone.as_str());
            Ok(CodeCheck::Approved)
        } else {
            Ok(CodeCheck::Denied)
        }
    }
}
