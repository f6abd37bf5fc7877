use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of both send-code routes
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeRequest {
    /// US phone number in any common format, e.g. "(515) 555-1234"
    #[validate(length(min = 10, message = "Phone number must be at least 10 characters"))]
    pub phone: String,
}

/// Body of both verify routes
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    #[validate(length(min = 10, message = "Phone number must be at least 10 characters"))]
    pub phone: String,

    #[validate(length(min = 4, message = "Verification code must be at least 4 characters"))]
    pub verification_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Registration verify result; the caller creates the account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVerifyResponse {
    pub success: bool,
    /// Canonical E.164 phone
    pub phone: String,
}
