//! HTTP surface of the CRM backend
//!
//! Exposes the authentication routes, the `JwtAuth` gate that protects
//! collaborator endpoints, and the application factory used by `main` and
//! the integration tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, no_collaborators, AppState};
