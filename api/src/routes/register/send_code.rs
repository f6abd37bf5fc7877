use actix_web::{web, HttpResponse};
use validator::Validate;

use sw_core::domain::value_objects::VerificationPurpose;
use sw_core::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use sw_core::services::VerificationProvider;

use crate::app::AppState;
use crate::dto::{SendCodeRequest, SuccessResponse};
use crate::extractors::RequestOrigin;
use crate::handlers::{handle_auth_error, validation_error_response};

/// Handler for POST /api/register/send-code
///
/// Same contract as the login route, with the registration send limits.
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
        .request_code(&request.phone, &origin.0, VerificationPurpose::Registration)
        .await
    {
        Ok(result) => {
            tracing::info!(phone = %result.phone.masked(), "Registration code requested");
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Err(error) => {
            tracing::warn!(
                origin = %origin.0.key(),
                error = %error,
                "Registration code request failed"
            );
            handle_auth_error(&error, state.coordinator.now())
        }
    }
}
