use actix_web::{web, HttpResponse};
use validator::Validate;

use sw_core::domain::value_objects::VerificationPurpose;
use sw_core::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use sw_core::services::VerificationProvider;

use crate::app::AppState;
use crate::dto::{SuccessResponse, VerifyCodeRequest};
use crate::extractors::RequestOrigin;
use crate::handlers::{handle_auth_error, internal_error, validation_error_response};
use crate::session::session_cookie;

/// Handler for POST /api/auth/verify
///
/// # Request Body
///
/// ```json
/// { "phone": "5155551234", "verificationCode": "123456" }
/// ```
///
/// On success responds `200 {"success": true}` and sets the session cookie
/// to the matched subject id.
///
/// ## Errors
/// - 400 Invalid phone, code format or wrong code
/// - 404 No account (only when revealed)
/// - 429 Too many attempts, with `Retry-After`
/// - 502/503 Provider failure
pub async fn verify_code<P, S, A, U>(
    state: web::Data<AppState<P, S, A, U>>,
    origin: RequestOrigin,
    request: web::Json<VerifyCodeRequest>,
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

    let result = match state
        .coordinator
        .check_code(
            &request.phone,
            &request.verification_code,
            &origin.0,
            VerificationPurpose::Login,
        )
        .await
    {
        Ok(result) => result,
        Err(error) => {
            tracing::warn!(origin = %origin.0.key(), error = %error, "Login verification failed");
            return handle_auth_error(&error, state.coordinator.now());
        }
    };

    let Some(subject) = result.subject_id else {
        tracing::error!(phone = %result.phone.masked(), "Approved login without a subject");
        return internal_error();
    };

    tracing::info!(phone = %result.phone.masked(), subject = %subject, "Login verified");

    HttpResponse::Ok()
        .cookie(session_cookie(&state.session, subject))
        .json(SuccessResponse::ok())
}
