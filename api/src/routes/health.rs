use actix_web::{web, HttpResponse};

use sw_core::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use sw_core::services::VerificationProvider;

use crate::app::AppState;

/// Handler for GET /health
///
/// Pings the database when the mysql backend is in use; 503 when it
/// cannot be reached.
pub async fn health_check<P, S, A, U>(state: web::Data<AppState<P, S, A, U>>) -> HttpResponse
where
    P: VerificationProvider + 'static,
    S: RateLimitStore + 'static,
    A: AttemptLogRepository + 'static,
    U: UserRepository + 'static,
{
    let (store, healthy) = match &state.database {
        Some(pool) => ("mysql", matches!(pool.health_check().await, Ok(true))),
        None => ("memory", true),
    };

    let body = serde_json::json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "store": store,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
