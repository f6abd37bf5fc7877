//! Error types for phone verification and attempt accounting
//!
//! Messages here are for logs and internal callers. The HTTP layer maps each
//! variant to a status code and a user-facing message of its own.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::entities::rate_limit::RateLimitScope;

/// Verification flow errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Input is not a US phone number. `input` is kept for callers but never
    /// rendered, so raw numbers stay out of logs.
    #[error("Invalid phone format")]
    InvalidPhoneFormat { input: String },

    #[error("Invalid input: {field}")]
    InvalidInput { field: String },

    #[error("Rate limit exceeded for {scope} until {reset_at}")]
    RateLimited {
        scope: RateLimitScope,
        reset_at: DateTime<Utc>,
    },

    #[error("Verification provider unavailable")]
    ProviderUnavailable,

    #[error("Verification provider error")]
    ProviderError,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Account not found")]
    NotFound,

    #[error("Attempt store unavailable")]
    StoreUnavailable,
}

impl AuthError {
    /// Instant after which a denied caller may retry, when the error carries one
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        match self {
            AuthError::RateLimited { reset_at, .. } => Some(*reset_at),
            _ => None,
        }
    }
}

/// Attempt store errors
///
/// Raised by rate-limit stores, the attempt log and the user lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Corrupt store record: {message}")]
    Corrupt { message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AuthError {
    fn from(_: StoreError) -> Self {
        AuthError::StoreUnavailable
    }
}

/// Verification provider errors
///
/// Provider calls are never retried here; a retry would spend another
/// rate-limit slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Timeout, connection failure or 5xx
    #[error("Provider unavailable: {message}")]
    Unavailable { message: String },

    /// Provider refused the request
    #[error("Provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<ProviderError> for AuthError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Unavailable { .. } => AuthError::ProviderUnavailable,
            ProviderError::Rejected { .. } => AuthError::ProviderError,
        }
    }
}
