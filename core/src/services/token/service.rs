//! Main token service implementation

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::token::{
    AccessClaims, PendingRefreshToken, RefreshToken, RevocationOutcome, RotationOutcome,
};
use crate::domain::entities::user::User;
use crate::domain::value_objects::{IssuedToken, RotatedSession};
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{TokenRepository, UserRepository};

use super::config::TokenServiceConfig;
use super::verifier::AccessTokenVerifier;

/// Number of random bytes in a refresh token
const REFRESH_TOKEN_BYTES: usize = 32;

/// Generates a new opaque refresh token value
///
/// 256 bits from the thread-local CSPRNG, URL-safe base64 without padding.
pub fn generate_refresh_token_value() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hashes a refresh token for storage and lookup
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Service for managing access tokens and refresh tokens
pub struct TokenService<T: TokenRepository, U: UserRepository> {
    token_repository: Arc<T>,
    user_repository: Arc<U>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<T: TokenRepository, U: UserRepository> TokenService<T, U> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `token_repository` - Refresh token persistence
    /// * `user_repository` - Used to load fresh identity on rotation
    /// * `config` - Signing secret, lifetimes and claim values
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or an error when the secret is empty
    pub fn new(
        token_repository: Arc<T>,
        user_repository: Arc<U>,
        config: TokenServiceConfig,
    ) -> Result<Self, DomainError> {
        if config.jwt_secret.is_empty() {
            return Err(DomainError::internal("JWT secret must not be empty"));
        }

        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        // Expiry is compared against an explicit clock in verify_access_token_at
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            token_repository,
            user_repository,
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Service configuration
    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issues a signed access token carrying the user's id, email and role
    pub fn issue_access_token(&self, user: &User) -> Result<IssuedToken, DomainError> {
        self.issue_access_token_at(user, Utc::now())
    }

    /// Issues an access token as if the current time were `now`
    pub fn issue_access_token_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, DomainError> {
        let claims = AccessClaims::for_user(
            user,
            now,
            self.config.access_token_lifetime,
            &self.config.issuer,
            &self.config.audience,
        );
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;

        Ok(IssuedToken::new(token, claims.expires_at()))
    }

    /// Verifies an access token at the current time
    ///
    /// # Returns
    ///
    /// * `Ok(AccessClaims)` - The embedded identity if valid
    /// * `Err(TokenError::ExpiredToken)` - Past expiry
    /// * `Err(TokenError::InvalidSignature)` - Integrity check failed
    /// * `Err(TokenError::MalformedToken)` - Undecodable or foreign claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.verify_access_token_at(token, Utc::now())
    }

    /// Verifies an access token as if the current time were `now`
    pub fn verify_access_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, TokenError> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                _ => TokenError::MalformedToken,
            })?;

        let claims = token_data.claims;
        if claims.is_expired_at(now) {
            return Err(TokenError::ExpiredToken);
        }
        if claims.user_id().is_err() {
            return Err(TokenError::MalformedToken);
        }

        Ok(claims)
    }

    /// Issues and persists a refresh token for `user_id`
    ///
    /// Only the hash is stored; the raw value is returned once, for the
    /// client.
    pub async fn issue_refresh_token(&self, user_id: Uuid) -> Result<IssuedToken, DomainError> {
        self.issue_refresh_token_at(user_id, Utc::now()).await
    }

    /// Issues a refresh token as if the current time were `now`
    pub async fn issue_refresh_token_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, DomainError> {
        let raw = generate_refresh_token_value();
        let token = RefreshToken::new(
            user_id,
            hash_refresh_token(&raw),
            now,
            self.config.refresh_token_lifetime,
        );

        let saved = self.token_repository.save_refresh_token(token).await?;
        debug!(user_id = %user_id, token_id = %saved.id, "Refresh token issued");

        Ok(IssuedToken::new(raw, saved.expires_at))
    }

    /// Exchanges a refresh token for a new access/refresh pair
    ///
    /// The presented token is revoked and linked to its replacement in one
    /// atomic store operation, so it can succeed at most once.
    ///
    /// # Returns
    ///
    /// * `Ok(RotatedSession)` - New access and refresh tokens
    /// * `Err(TokenError::TokenNotFound)` - Unknown token
    /// * `Err(TokenError::TokenRevoked)` - Already revoked or already rotated
    /// * `Err(TokenError::TokenExpired)` - Past expiry
    pub async fn rotate_refresh_token(&self, token: &str) -> Result<RotatedSession, DomainError> {
        self.rotate_refresh_token_at(token, Utc::now()).await
    }

    /// Rotates a refresh token as if the current time were `now`
    pub async fn rotate_refresh_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RotatedSession, DomainError> {
        let raw_replacement = generate_refresh_token_value();
        let pending = PendingRefreshToken::new(
            hash_refresh_token(&raw_replacement),
            now,
            self.config.refresh_token_lifetime,
        );

        let outcome = self
            .token_repository
            .rotate_refresh_token(&hash_refresh_token(token), pending, now)
            .await?;

        let (previous, replacement) = match outcome {
            RotationOutcome::Rotated {
                previous,
                replacement,
            } => (previous, replacement),
            RotationOutcome::NotFound => return Err(TokenError::TokenNotFound.into()),
            RotationOutcome::Expired(_) => return Err(TokenError::TokenExpired.into()),
            RotationOutcome::Revoked(reused) => {
                self.handle_reuse(&reused).await?;
                return Err(TokenError::TokenRevoked.into());
            }
        };

        // Fresh identity: role or email may have changed since the last login
        let user = self
            .user_repository
            .find_by_id(previous.user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;
        let access_token = self.issue_access_token_at(&user, now)?;

        info!(
            user_id = %user.id,
            token_id = %previous.id,
            replaced_by = %replacement.id,
            "Refresh token rotated"
        );

        Ok(RotatedSession {
            access_token,
            refresh_token: IssuedToken::new(raw_replacement, replacement.expires_at),
        })
    }

    /// Replay of a revoked token; optionally revoke the whole lineage
    async fn handle_reuse(&self, reused: &RefreshToken) -> Result<(), DomainError> {
        warn!(
            user_id = %reused.user_id,
            token_id = %reused.id,
            rotated = reused.replaced_by.is_some(),
            "Revoked refresh token presented again"
        );

        if self.config.revoke_lineage_on_reuse {
            let revoked = self
                .token_repository
                .revoke_all_user_tokens(reused.user_id)
                .await?;
            warn!(
                user_id = %reused.user_id,
                revoked,
                "Revoked all refresh tokens after reuse"
            );
        }

        Ok(())
    }

    /// Revokes a refresh token
    ///
    /// Idempotent: unknown and already revoked tokens are not errors, but the
    /// outcome tells them apart.
    pub async fn revoke_refresh_token(&self, token: &str) -> Result<RevocationOutcome, DomainError> {
        let outcome = self
            .token_repository
            .revoke_token(&hash_refresh_token(token))
            .await?;

        match outcome {
            RevocationOutcome::Revoked => debug!("Refresh token revoked"),
            RevocationOutcome::AlreadyRevoked => debug!("Refresh token was already revoked"),
            RevocationOutcome::NotFound => debug!("Revocation requested for unknown refresh token"),
        }

        Ok(outcome)
    }

    /// Revokes every refresh token of a user
    pub async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let revoked = self.token_repository.revoke_all_user_tokens(user_id).await?;
        info!(user_id = %user_id, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }

    /// Number of active sessions (usable refresh tokens) for a user
    pub async fn active_session_count(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.token_repository
            .count_active_sessions(user_id, Utc::now())
            .await
    }
}

impl<T: TokenRepository, U: UserRepository> AccessTokenVerifier for TokenService<T, U> {
    fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.verify_access_token_at(token, Utc::now())
    }
}
