//! Route handlers
//!
//! - `auth` - register, login, refresh, logout and the current profile
//! - `health` - liveness probe

pub mod auth;
pub mod health;
