//! # CRM Core
//!
//! Core business logic and domain layer for the CRM backend.
//! This crate contains domain entities, the session and credential services,
//! repository interfaces, and error types. It has no knowledge of HTTP or of
//! any particular database.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{AccessClaims, RefreshToken, Role, User};
pub use domain::value_objects::{AuthSession, IssuedToken, RotatedSession};
pub use errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
pub use repositories::{TokenRepository, UserRepository};
pub use services::{AccessTokenVerifier, AuthService, TokenService};
