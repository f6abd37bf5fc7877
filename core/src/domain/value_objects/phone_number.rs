//! US phone number in canonical E.164 form.

use std::fmt;

use serde::Serialize;
use sw_shared::utils::phone::mask_phone_number;

use crate::errors::AuthError;

/// Canonical `+1XXXXXXXXXX` phone number.
///
/// Only [`PhoneNumber::parse`] constructs one, so every instance went through
/// normalization. `Debug` output is masked; use [`PhoneNumber::as_str`] where
/// the full number is needed (provider calls, storage).
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize raw input to E.164.
    ///
    /// Rules, in order:
    /// 1. trim
    /// 2. a leading `+` is accepted only as `+1`, and then must carry exactly
    ///    11 digits
    /// 3. otherwise strip non-digits: 11 digits starting with `1` gain a `+`,
    ///    10 digits gain `+1`
    ///
    /// Every accepted input yields `+1` followed by ten digits, so each number
    /// has exactly one canonical form whatever punctuation it was typed with.
    /// Anything else fails with [`AuthError::InvalidPhoneFormat`]. The check
    /// is on shape only, so `0000000000` is accepted.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let trimmed = raw.trim();
        let invalid = || AuthError::InvalidPhoneFormat {
            input: raw.to_string(),
        };

        let international = trimmed.starts_with('+');
        if international && !trimmed.starts_with("+1") {
            return Err(invalid());
        }

        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
        match digits.len() {
            11 if digits.starts_with('1') => Ok(Self(format!("+{}", digits))),
            10 if !international => Ok(Self(format!("+1{}", digits))),
            _ => Err(invalid()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log-safe rendering, e.g. `+1******1234`
    pub fn masked(&self) -> String {
        mask_phone_number(&self.0)
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PhoneNumber").field(&self.masked()).finish()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
