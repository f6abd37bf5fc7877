//! Verification flow value types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::rate_limit::RateLimitPurpose;

/// Why a code is being sent or checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationPurpose {
    Login,
    Registration,
}

impl VerificationPurpose {
    /// Counter consumed by a code request for this purpose
    pub fn send_limit(&self) -> RateLimitPurpose {
        match self {
            VerificationPurpose::Login => RateLimitPurpose::SendCode,
            VerificationPurpose::Registration => RateLimitPurpose::RegisterSend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationPurpose::Login => "login",
            VerificationPurpose::Registration => "registration",
        }
    }
}

impl fmt::Display for VerificationPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of one (phone, purpose) verification session.
/// `Verified` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    NoCodeSent,
    CodeSent,
    Verified,
}

impl VerificationState {
    /// Apply a transition. Once verified, further events leave the state alone.
    pub fn advance(self, next: VerificationState) -> VerificationState {
        match self {
            VerificationState::Verified => VerificationState::Verified,
            _ => next,
        }
    }
}

/// Id of the account a verified phone belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub Uuid);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for SubjectId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
