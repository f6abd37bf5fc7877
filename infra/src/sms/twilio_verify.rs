//! Twilio Verify v2 provider
//!
//! Twilio generates, delivers and checks the codes; nothing is stored here.
//!
//! - `POST {base}/Services/{sid}/Verifications` with `To`, `Channel=sms`
//! - `POST {base}/Services/{sid}/VerificationCheck` with `To`, `Code`
//!
//! Requests are never retried. A retry would deliver a second code for a
//! single rate-limit slot.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use sw_core::domain::value_objects::{PhoneNumber, VerificationCode};
use sw_core::errors::ProviderError;
use sw_core::services::{CodeCheck, VerificationProvider};
use sw_shared::config::SmsConfig;

use crate::InfrastructureError;

/// Twilio Verify configuration
#[derive(Debug, Clone)]
pub struct TwilioVerifyConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// Verify service SID
    pub service_sid: String,
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Timeout for API requests
    pub request_timeout: Duration,
}

impl From<&SmsConfig> for TwilioVerifyConfig {
    fn from(config: &SmsConfig) -> Self {
        Self {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            service_sid: config.verify_service_sid.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

impl TwilioVerifyConfig {
    pub fn verifications_url(&self) -> String {
        format!("{}/Services/{}/Verifications", self.base_url, self.service_sid)
    }

    pub fn verification_check_url(&self) -> String {
        format!("{}/Services/{}/VerificationCheck", self.base_url, self.service_sid)
    }
}

#[derive(Debug, Deserialize)]
struct VerificationResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<u32>,
    message: Option<String>,
}

/// Twilio Verify provider
pub struct TwilioVerifyProvider {
    client: reqwest::Client,
    config: TwilioVerifyConfig,
}

impl TwilioVerifyProvider {
    pub fn new(config: TwilioVerifyConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.is_empty()
            || config.auth_token.is_empty()
            || config.service_sid.is_empty()
        {
            return Err(InfrastructureError::Sms(
                "Twilio Verify requires account_sid, auth_token and verify_service_sid"
                    .to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        info!(service_sid = %config.service_sid, "Twilio Verify provider initialized");

        Ok(Self { client, config })
    }

    pub fn from_config(config: &SmsConfig) -> Result<Self, InfrastructureError> {
        Self::new(TwilioVerifyConfig::from(config))
    }

    async fn post_form(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, ProviderError> {
        self.client
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(params)
            .send()
            .await
            .map_err(transport_error)
    }

    async fn parse_status(response: reqwest::Response) -> Result<String, ProviderError> {
        let body: VerificationResponse = response.json().await.map_err(transport_error)?;
        Ok(body.status)
    }
}

#[async_trait]
impl VerificationProvider for TwilioVerifyProvider {
    async fn send_code(&self, phone: &PhoneNumber) -> Result<(), ProviderError> {
        let url = self.config.verifications_url();
        let response = self
            .post_form(&url, &[("To", phone.as_str()), ("Channel", "sms")])
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = rejection(status, response).await;
            warn!(phone = %phone.masked(), error = %error, "Twilio refused to send code");
            return Err(error);
        }

        let verification_status = Self::parse_status(response).await?;
        debug!(
            phone = %phone.masked(),
            status = %verification_status,
            "Verification code sent"
        );
        Ok(())
    }

    async fn check_code(
        &self,
        phone: &PhoneNumber,
        code: &VerificationCode,
    ) -> Result<CodeCheck, ProviderError> {
        let url = self.config.verification_check_url();
        let response = self
            .post_form(&url, &[("To", phone.as_str()), ("Code", code.as_str())])
            .await?;

        let status = response.status();
        // No pending verification: expired, already approved or never sent
        if status == StatusCode::NOT_FOUND {
            debug!(phone = %phone.masked(), "No pending verification");
            return Ok(CodeCheck::Denied);
        }
        if !status.is_success() {
            let error = rejection(status, response).await;
            warn!(phone = %phone.masked(), error = %error, "Twilio refused code check");
            return Err(error);
        }

        let verification_status = Self::parse_status(response).await?;
        Ok(check_outcome(&verification_status))
    }
}

/// Verdict for a VerificationCheck `status` field
pub fn check_outcome(status: &str) -> CodeCheck {
    if status == "approved" {
        CodeCheck::Approved
    } else {
        CodeCheck::Denied
    }
}

/// Classify a non-success HTTP status
pub fn classify_status(status: StatusCode, message: impl Into<String>) -> ProviderError {
    if status.is_server_error() {
        ProviderError::Unavailable {
            message: format!("{}: {}", status, message.into()),
        }
    } else {
        ProviderError::Rejected {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

async fn rejection(status: StatusCode, response: reqwest::Response) -> ProviderError {
    let message = match response.json::<TwilioErrorBody>().await {
        Ok(TwilioErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{} (code {})", message, code),
        Ok(TwilioErrorBody {
            message: Some(message),
            ..
        }) => message,
        _ => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    };
    classify_status(status, message)
}

/// Timeouts, connection failures and unreadable responses
fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        error!("Twilio request timed out");
    } else if e.is_connect() {
        error!(error = %e, "Failed to connect to Twilio");
    } else {
        error!(error = %e, "Twilio request failed");
    }
    ProviderError::Unavailable {
        message: e.to_string(),
    }
}
