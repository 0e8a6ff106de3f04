//! Application state and factory
//!
//! `create_app` builds the complete Actix application from an `AppState`.
//! `main` and the integration tests both go through it, so the routing and
//! middleware order under test is the one that ships.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use crm_core::repositories::{TokenRepository, UserRepository};
use crm_core::services::{AccessTokenVerifier, AuthService};
use crm_shared::config::{CorsConfig, SessionConfig};

use crate::handlers::{json_error_handler, ApiError};
use crate::middleware::{create_cors, JwtAuth};
use crate::routes;

const DEFAULT_JSON_LIMIT: usize = 64 * 1024;

/// Shared state handed to every handler
pub struct AppState<U, T>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    pub auth_service: Arc<AuthService<U, T>>,
    /// Verifier used by the JWT gate
    pub verifier: Arc<dyn AccessTokenVerifier>,
    /// Refresh cookie attributes
    pub session: SessionConfig,
    pub cors: CorsConfig,
    /// Maximum JSON body size in bytes
    pub json_limit: usize,
}

impl<U, T> AppState<U, T>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    pub fn new(auth_service: Arc<AuthService<U, T>>, session: SessionConfig, cors: CorsConfig) -> Self {
        let verifier: Arc<dyn AccessTokenVerifier> = auth_service.token_service().clone();
        Self {
            auth_service,
            verifier,
            session,
            cors,
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }

    pub fn with_json_limit(mut self, limit: usize) -> Self {
        self.json_limit = limit;
        self
    }
}

/// Hook for mounting business endpoints behind the JWT gate
pub type Collaborators = fn(&mut web::ServiceConfig);

/// Mounts nothing; the default when no business endpoints are wired
pub fn no_collaborators(_: &mut web::ServiceConfig) {}

/// Create and configure the application
///
/// Routes:
/// - `GET /` service descriptor
/// - `GET /api/health`
/// - `/api/auth/*` session endpoints
/// - anything `collaborators` mounts under `/api`, always behind `JwtAuth`
///
/// Everything else answers `404 NOT_FOUND`.
pub fn create_app<U, T>(
    state: web::Data<AppState<U, T>>,
    collaborators: Collaborators,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    let cors = create_cors(&state.cors);
    let jwt = JwtAuth::new(state.verifier.clone());
    let json_config = web::JsonConfig::default()
        .limit(state.json_limit)
        .error_handler(json_error_handler);

    App::new()
        .app_data(state)
        .app_data(json_config)
        // Registered last, runs first: every request gets a span, CORS included
        .wrap(cors)
        .wrap(TracingLogger::default())
        .route("/", web::get().to(service_descriptor))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(routes::health::health_check))
                .service(routes::auth::scope::<U, T>(jwt.clone()))
                .service(web::scope("").wrap(jwt).configure(collaborators)),
        )
        .default_service(web::route().to(not_found))
}

/// Root endpoint listing the public routes
async fn service_descriptor() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "CRM Authentication API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "register": "POST /api/auth/register",
            "login": "POST /api/auth/login",
            "me": "GET /api/auth/me",
            "logout": "POST /api/auth/logout",
            "refreshToken": "POST /api/auth/refresh-token",
        },
    }))
}

async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}
