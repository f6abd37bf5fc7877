//! Append-only verification attempt records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ClientOrigin, PhoneNumber};

/// One code check, recorded whatever its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationAttempt {
    pub id: Uuid,
    /// Canonical E.164 phone the code was checked for
    pub phone: String,
    /// Origin IP, absent for degraded origins
    pub ip_address: Option<String>,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

impl VerificationAttempt {
    pub fn new(
        phone: &PhoneNumber,
        origin: &ClientOrigin,
        success: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone: phone.as_str().to_string(),
            ip_address: origin.ip_address().map(str::to_string),
            success,
            created_at,
        }
    }
}

/// Which attempts a log query selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFilter<'a> {
    Phone(&'a str),
    Ip(&'a str),
}

impl AttemptFilter<'_> {
    pub fn matches(&self, attempt: &VerificationAttempt) -> bool {
        match self {
            AttemptFilter::Phone(phone) => attempt.phone == *phone,
            AttemptFilter::Ip(ip) => attempt.ip_address.as_deref() == Some(*ip),
        }
    }
}
