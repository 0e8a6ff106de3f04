//! CORS middleware configuration for cross-origin requests.
//!
//! The browser client sends the refresh cookie cross-origin, so origins are
//! an explicit allow-list and credentials are enabled. A wildcard origin is
//! never combined with credentials.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use crm_shared::config::CorsConfig;

/// Creates a CORS middleware instance from the configured origins
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .max_age(config.max_age);

    for origin in config.allowed_origins.iter().map(|o| o.trim()) {
        if !origin.is_empty() {
            tracing::info!("Adding allowed origin: {}", origin);
            cors = cors.allowed_origin(origin);
        }
    }

    if config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors
}
