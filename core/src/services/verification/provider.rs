//! Verification provider port

use async_trait::async_trait;

use crate::domain::value_objects::{PhoneNumber, VerificationCode};
use crate::errors::ProviderError;

/// Provider verdict on a submitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Approved,
    Denied,
}

/// External service that sends codes and owns their validity.
/// No code is stored by this service.
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    /// Deliver a fresh code to `phone`
    async fn send_code(&self, phone: &PhoneNumber) -> Result<(), ProviderError>;

    /// Ask whether `code` is the current code for `phone`
    async fn check_code(
        &self,
        phone: &PhoneNumber,
        code: &VerificationCode,
    ) -> Result<CodeCheck, ProviderError>;
}
