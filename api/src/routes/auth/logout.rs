use actix_web::{web, HttpResponse};

use sw_core::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use sw_core::services::VerificationProvider;

use crate::app::AppState;
use crate::dto::SuccessResponse;
use crate::session::cleared_session_cookie;

/// Handler for POST /api/auth/logout
///
/// Clears the session cookie. Always succeeds.
pub async fn logout<P, S, A, U>(state: web::Data<AppState<P, S, A, U>>) -> HttpResponse
where
    P: VerificationProvider + 'static,
    S: RateLimitStore + 'static,
    A: AttemptLogRepository + 'static,
    U: UserRepository + 'static,
{
    HttpResponse::Ok()
        .cookie(cleared_session_cookie(&state.session))
        .json(SuccessResponse::ok())
}
