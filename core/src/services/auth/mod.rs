//! Authentication service module
//!
//! This module implements the session lifecycle on top of the token service:
//! - Email/password registration and login
//! - Refresh token rotation and logout
//! - Fresh profile lookup for the current identity

mod config;
mod password;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use password::PasswordHasher;
pub use service::AuthService;
