use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{info, warn};

use crm_api::{create_app, no_collaborators, telemetry, AppState};
use crm_core::services::{
    AuthService, AuthServiceConfig, TokenCleanupConfig, TokenCleanupService, TokenService,
    TokenServiceConfig,
};
use crm_infra::{DatabasePool, MySqlTokenRepository, MySqlUserRepository};
use crm_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_tracing(&config.logging);

    info!(environment = ?config.environment, "Starting CRM API server");

    if config.auth.jwt.is_using_default_secret() {
        if config.environment.is_production() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        warn!("JWT_SECRET is not set; using the development default");
    }

    // Schema problems are fatal: the server never starts half-initialized
    let database = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the database")?;
    database
        .initialize_schema()
        .await
        .context("failed to initialize the database schema")?;
    info!(stats = %database.get_statistics(), "Database ready");

    let pool = database.get_pool().clone();
    let user_repository = Arc::new(MySqlUserRepository::new(pool.clone()));
    let token_repository = Arc::new(MySqlTokenRepository::new(pool));

    let token_service = Arc::new(
        TokenService::new(
            token_repository.clone(),
            user_repository.clone(),
            TokenServiceConfig::from(&config.auth),
        )
        .context("failed to build the token service")?,
    );
    let auth_service = Arc::new(AuthService::new(
        user_repository,
        token_service,
        AuthServiceConfig::from(&config.auth),
    ));

    let cleanup = Arc::new(TokenCleanupService::new(
        token_repository,
        TokenCleanupConfig::from(&config.auth.cleanup),
    ));
    let cleanup_handle = cleanup.start_background_task();

    let state = web::Data::new(
        AppState::new(auth_service, config.auth.session.clone(), config.cors.clone())
            .with_json_limit(config.server.max_payload_size),
    );

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Listening");

    let mut server = HttpServer::new(move || create_app(state.clone(), no_collaborators));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
    database.close().await;
    info!("Server stopped");

    result.context("server error")
}
