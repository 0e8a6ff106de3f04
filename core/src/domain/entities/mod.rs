//! Domain entities representing core business objects.

pub mod token;
pub mod user;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use token::{
    AccessClaims, PendingRefreshToken, RefreshToken, RevocationOutcome, RotationOutcome,
};
pub use user::{normalize_email, Role, User};
