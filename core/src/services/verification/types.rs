//! Result types for the verification coordinator

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{PhoneNumber, SubjectId, VerificationPurpose};

/// Result of a code request
#[derive(Debug, Clone)]
pub struct SendCodeResult {
    pub phone: PhoneNumber,
    pub purpose: VerificationPurpose,
    /// False when the request was answered without contacting the provider
    /// (login for an unknown phone with account existence concealed)
    pub delivered: bool,
}

/// Result of an approved code check
#[derive(Debug, Clone)]
pub struct VerifyCodeResult {
    pub phone: PhoneNumber,
    /// Account to issue a session for. Always `None` for registration.
    pub subject_id: Option<SubjectId>,
    pub verified_at: DateTime<Utc>,
}
