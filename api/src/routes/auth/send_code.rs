use actix_web::{web, HttpResponse};
use validator::Validate;

use sw_core::domain::value_objects::VerificationPurpose;
use sw_core::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use sw_core::services::VerificationProvider;

use crate::app::AppState;
use crate::dto::{SendCodeRequest, SuccessResponse};
use crate::extractors::RequestOrigin;
use crate::handlers::{handle_auth_error, validation_error_response};

/// Handler for POST /api/auth/send-code
///
/// # Request Body
///
/// ```json
/// { "phone": "(515) 555-1234" }
/// ```
///
/// # Response
///
/// `200 {"success": true}`, also for phones without an account unless
/// account existence is revealed by configuration.
///
/// ## Errors
/// - 400 Invalid phone format
/// - 404 No account (only when revealed)
/// - 429 Rate limit exceeded, with `Retry-After`
/// - 502/503 Provider failure
pub async fn send_code<P, S, A, U>(
    state: web::Data<AppState<P, S, A, U>>,
    origin: RequestOrigin,
    request: web::Json<SendCodeRequest>,
) -> HttpResponse
where
    P: VerificationProvider + 'static,
    S: RateLimitStore + 'static,
    A: AttemptLogRepository + 'static,
    U: UserRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    match state
        .coordinator
        .request_code(&request.phone, &origin.0, VerificationPurpose::Login)
        .await
    {
        Ok(result) => {
            tracing::info!(
                phone = %result.phone.masked(),
                delivered = result.delivered,
                "Login code requested"
            );
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Err(error) => {
            tracing::warn!(origin = %origin.0.key(), error = %error, "Login code request failed");
            handle_auth_error(&error, state.coordinator.now())
        }
    }
}
