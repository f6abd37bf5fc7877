//! Error to HTTP response mapping
//!
//! | error | status |
//! |-------|--------|
//! | invalid phone, invalid input, invalid code | 400 |
//! | account not found | 404 |
//! | rate limited, store unavailable | 429 |
//! | provider error | 502 |
//! | provider unavailable | 503 |
//! | anything else | 500 |
//!
//! A store failure is answered like a rate limit so that a broken store
//! can never be told apart from, or used to bypass, a denial.

use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use sw_core::domain::entities::retry_after_seconds;
use sw_core::errors::AuthError;
use sw_shared::{error_codes, ErrorResponse};
use validator::ValidationErrors;

const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

/// Map a verification failure to its HTTP response. `now` comes from the
/// coordinator's clock so `Retry-After` agrees with the window reset.
pub fn handle_auth_error(error: &AuthError, now: DateTime<Utc>) -> HttpResponse {
    match error {
        AuthError::InvalidPhoneFormat { .. } => HttpResponse::BadRequest().json(
            ErrorResponse::new(error_codes::PHONE_INVALID, "Invalid phone format"),
        ),
        AuthError::InvalidInput { field } => HttpResponse::BadRequest().json(
            ErrorResponse::new(error_codes::INVALID_INPUT, format!("Invalid {}", field))
                .add_detail("field", field),
        ),
        AuthError::InvalidCode => HttpResponse::BadRequest().json(ErrorResponse::new(
            error_codes::VERIFICATION_CODE_INVALID,
            "Invalid verification code",
        )),
        AuthError::NotFound => HttpResponse::NotFound().json(ErrorResponse::new(
            error_codes::NOT_FOUND,
            "No account found for this phone number",
        )),
        AuthError::RateLimited { scope, reset_at } => {
            let retry_after = retry_after_seconds(*reset_at, now);
            HttpResponse::TooManyRequests()
                .insert_header(("Retry-After", retry_after.to_string()))
                .json(
                    ErrorResponse::new(error_codes::RATE_LIMIT_EXCEEDED, RATE_LIMIT_MESSAGE)
                        .add_detail("retry_after_seconds", retry_after)
                        .add_detail("scope", scope.as_str()),
                )
        }
        AuthError::StoreUnavailable => HttpResponse::TooManyRequests().json(ErrorResponse::new(
            error_codes::RATE_LIMIT_EXCEEDED,
            RATE_LIMIT_MESSAGE,
        )),
        AuthError::ProviderUnavailable => HttpResponse::ServiceUnavailable().json(
            ErrorResponse::new(
                error_codes::PROVIDER_UNAVAILABLE,
                "Verification service is temporarily unavailable",
            ),
        ),
        AuthError::ProviderError => HttpResponse::BadGateway().json(ErrorResponse::new(
            error_codes::PROVIDER_ERROR,
            "Verification service error",
        )),
    }
}

/// 400 listing the fields that failed request validation
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();

    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::INVALID_INPUT, "Invalid request data")
            .add_detail("fields", fields),
    )
}

/// Generic 500
pub fn internal_error() -> HttpResponse {
    HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR).json(ErrorResponse::new(
        error_codes::INTERNAL_ERROR,
        "An internal error occurred",
    ))
}

/// Malformed or oversized JSON bodies
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %error, "Rejected JSON payload");
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::INVALID_INPUT,
        "Request body must be valid JSON",
    ));
    actix_web::error::InternalError::from_response(error, response).into()
}
