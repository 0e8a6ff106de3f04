//! Authentication configuration

use serde::{Deserialize, Serialize};

use super::env_or;

const DEFAULT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604800,  // 7 days
            issuer: String::from("crm-backend"),
            audience: String::from("crm-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Refresh-token cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the refresh token
    pub cookie_name: String,

    /// Cookie path; the refresh token is only sent to the auth endpoints
    pub cookie_path: String,

    /// Cookie secure flag (HTTPS only)
    pub secure: bool,

    /// Cookie SameSite attribute (`Strict`, `Lax` or `None`)
    pub same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: String::from("refreshToken"),
            cookie_path: String::from("/api/auth"),
            secure: false,
            same_site: String::from("Lax"),
        }
    }
}

/// Expired refresh-token cleanup schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,

    /// Grace period after expiry before deletion (in days)
    pub grace_period_days: i64,

    /// Maximum number of rows deleted per statement
    pub batch_size: u32,

    /// Whether the background task runs at all
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            grace_period_days: 0,
            batch_size: 1000,
            enabled: true,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Refresh cookie configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Cleanup schedule
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// bcrypt work factor for password hashing
    pub bcrypt_cost: u32,

    /// Revoke every refresh token of a user when an already-rotated
    /// token is presented again
    pub revoke_lineage_on_reuse: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            session: SessionConfig::default(),
            cleanup: CleanupConfig::default(),
            bcrypt_cost: 12,
            revoke_lineage_on_reuse: false,
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let jwt_defaults = defaults.jwt;
        let session_defaults = defaults.session;
        let cleanup_defaults = defaults.cleanup;

        Self {
            jwt: JwtConfig {
                secret: std::env::var("JWT_SECRET").unwrap_or(jwt_defaults.secret),
                access_token_expiry: env_or(
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    jwt_defaults.access_token_expiry,
                ),
                refresh_token_expiry: env_or(
                    "JWT_REFRESH_TOKEN_EXPIRY",
                    jwt_defaults.refresh_token_expiry,
                ),
                issuer: std::env::var("JWT_ISSUER").unwrap_or(jwt_defaults.issuer),
                audience: std::env::var("JWT_AUDIENCE").unwrap_or(jwt_defaults.audience),
            },
            session: SessionConfig {
                cookie_name: std::env::var("REFRESH_COOKIE_NAME")
                    .unwrap_or(session_defaults.cookie_name),
                cookie_path: session_defaults.cookie_path,
                secure: env_or("COOKIE_SECURE", session_defaults.secure),
                same_site: std::env::var("COOKIE_SAME_SITE").unwrap_or(session_defaults.same_site),
            },
            cleanup: CleanupConfig {
                interval_seconds: env_or(
                    "TOKEN_CLEANUP_INTERVAL",
                    cleanup_defaults.interval_seconds,
                ),
                grace_period_days: env_or(
                    "TOKEN_CLEANUP_GRACE_DAYS",
                    cleanup_defaults.grace_period_days,
                ),
                batch_size: env_or("TOKEN_CLEANUP_BATCH_SIZE", cleanup_defaults.batch_size),
                enabled: env_or("TOKEN_CLEANUP_ENABLED", cleanup_defaults.enabled),
            },
            bcrypt_cost: env_or("BCRYPT_COST", defaults.bcrypt_cost),
            revoke_lineage_on_reuse: env_or(
                "REVOKE_LINEAGE_ON_REUSE",
                defaults.revoke_lineage_on_reuse,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14);

        assert_eq!(config.secret, "my-secret");
        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 14 * 86400);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "refreshToken");
        assert_eq!(config.cookie_path, "/api/auth");
        assert_eq!(config.same_site, "Lax");
    }

    #[test]
    fn test_auth_config_defaults_keep_single_token_revocation() {
        let config = AuthConfig::default();
        assert!(!config.revoke_lineage_on_reuse);
        assert_eq!(config.bcrypt_cost, 12);
    }
}
