use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use sw_api::telemetry::init_tracing;
use sw_api::{create_app, AppState};
use sw_core::clock::{Clock, SystemClock};
use sw_core::services::{Sweeper, SweeperConfig, VerificationCoordinator};
use sw_infra::{build_provider, build_stores, load_config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("Failed to load configuration")?;

    init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialise tracing")?;

    info!(environment = %config.environment, "Starting Stork Watch API server");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let stores = build_stores(&config)
        .await
        .context("Failed to initialise attempt stores")?;
    if let Some(pool) = &stores.pool {
        info!(stats = %pool.get_statistics(), "Database ready");
    }

    let provider = Arc::new(
        build_provider(&config.sms, clock.clone())
            .context("Failed to initialise verification provider")?,
    );

    let coordinator = Arc::new(
        VerificationCoordinator::from_config(
            provider,
            stores.rate_limits.clone(),
            stores.attempts.clone(),
            stores.users.clone(),
            &config.rate_limit,
            &config.verification,
            clock.clone(),
        )
        .context("Invalid rate limit policy table")?,
    );

    let sweeper = Arc::new(Sweeper::new(
        stores.rate_limits.clone(),
        stores.attempts.clone(),
        coordinator.sessions(),
        clock.clone(),
        SweeperConfig::from(&config.store),
    ));
    let sweeper_handle = sweeper.start();

    let app_state = web::Data::new(AppState {
        coordinator,
        session: config.session.clone(),
        database: stores.pool.clone(),
    });

    let bind_address = config.server.bind_address();
    let max_payload_size = config.server.max_payload_size;
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(app_state.clone(), max_payload_size));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await;

    info!("Server stopped, shutting down background tasks");
    sweeper_handle.stop().await;
    if let Some(pool) = &stores.pool {
        pool.close().await;
    }

    result.context("Server error")
}
