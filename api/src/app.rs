//! Application state and factory
//!
//! This module holds the shared application state and provides the factory
//! for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use sw_core::repositories::{AttemptLogRepository, RateLimitStore, UserRepository};
use sw_core::services::{VerificationCoordinator, VerificationProvider};
use sw_infra::DatabasePool;
use sw_shared::config::SessionConfig;
use sw_shared::{error_codes, ErrorResponse};

use crate::handlers::error::json_error_handler;
use crate::routes::{auth, health, register};

/// Application state that holds shared services
pub struct AppState<P, S, A, U>
where
    P: VerificationProvider,
    S: RateLimitStore,
    A: AttemptLogRepository,
    U: UserRepository,
{
    pub coordinator: Arc<VerificationCoordinator<P, S, A, U>>,
    pub session: SessionConfig,
    /// Pool of the mysql backend, pinged by the health check
    pub database: Option<DatabasePool>,
}

/// Create and configure the application with all dependencies
pub fn create_app<P, S, A, U>(
    app_state: web::Data<AppState<P, S, A, U>>,
    max_payload_size: usize,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    P: VerificationProvider + 'static,
    S: RateLimitStore + 'static,
    A: AttemptLogRepository + 'static,
    U: UserRepository + 'static,
{
    let json_config = web::JsonConfig::default()
        .limit(max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health::health_check::<P, S, A, U>))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/send-code", web::post().to(auth::send_code::<P, S, A, U>))
                        .route("/verify", web::post().to(auth::verify_code::<P, S, A, U>))
                        .route("/logout", web::post().to(auth::logout::<P, S, A, U>)),
                )
                .service(
                    web::scope("/register")
                        .route("/send-code", web::post().to(register::send_code::<P, S, A, U>))
                        .route("/verify", web::post().to(register::verify_code::<P, S, A, U>)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
