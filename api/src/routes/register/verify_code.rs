use actix_web::{web, HttpResponse};
use validator::Validate;

use sw_core::domain::value_objects::VerificationPurpose;
use sw_core::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use sw_core::services::VerificationProvider;

use crate::app::AppState;
use crate::dto::{RegisterVerifyResponse, VerifyCodeRequest};
use crate::extractors::RequestOrigin;
use crate::handlers::{handle_auth_error, validation_error_response};

/// Handler for POST /api/register/verify
///
/// Responds `200 {"success": true, "phone": "+15155551234"}` with the
/// canonical phone the caller should create the account under.
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

    match state
        .coordinator
        .check_code(
            &request.phone,
            &request.verification_code,
            &origin.0,
            VerificationPurpose::Registration,
        )
        .await
    {
        Ok(result) => {
            tracing::info!(phone = %result.phone.masked(), "Registration phone verified");
            HttpResponse::Ok().json(RegisterVerifyResponse {
                success: true,
                phone: result.phone.as_str().to_string(),
            })
        }
        Err(error) => {
            tracing::warn!(
                origin = %origin.0.key(),
                error = %error,
                "Registration verification failed"
            );
            handle_auth_error(&error, state.coordinator.now())
        }
    }
}
