//! # Infrastructure Layer
//!
//! Concrete persistence for the CRM backend, following Clean Architecture
//! principles: the core crate defines the repository traits, this crate
//! implements them on MySQL through SQLx.
//!
//! ## Architecture
//!
//! - **Database**: connection pool, schema initialization and the MySQL
//!   `UserRepository` / `TokenRepository` implementations
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use crm_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

#[cfg(feature = "mysql")]
pub use database::{DatabasePool, MySqlTokenRepository, MySqlUserRepository};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::internal(err.to_string())
    }
}
