//! Configuration for the token service

use chrono::Duration;
use crm_shared::config::AuthConfig;

/// Configuration for the token service
///
/// Passed in at construction; two services built from different configs
/// do not share any signing state.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// `iss` claim written and required on verification
    pub issuer: String,
    /// `aud` claim written and required on verification
    pub audience: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    pub refresh_token_lifetime: Duration,
    /// Revoke every token of a user when a rotated token is replayed
    pub revoke_lineage_on_reuse: bool,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            issuer: "crm-backend".to_string(),
            audience: "crm-api".to_string(),
            access_token_lifetime: Duration::minutes(15),
            refresh_token_lifetime: Duration::days(7),
            revoke_lineage_on_reuse: false,
        }
    }
}

impl From<&AuthConfig> for TokenServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            jwt_secret: config.jwt.secret.clone(),
            issuer: config.jwt.issuer.clone(),
            audience: config.jwt.audience.clone(),
            access_token_lifetime: Duration::seconds(config.jwt.access_token_expiry),
            refresh_token_lifetime: Duration::seconds(config.jwt.refresh_token_expiry),
            revoke_lineage_on_reuse: config.revoke_lineage_on_reuse,
        }
    }
}
