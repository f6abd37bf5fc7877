//! Submitted verification code.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AuthError;

static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4,10}$").unwrap());

/// Trimmed 4-10 digit code. Format only; the provider decides validity.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let trimmed = raw.trim();
        if CODE_PATTERN.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(AuthError::InvalidInput {
                field: "verificationCode".to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(****)")
    }
}
