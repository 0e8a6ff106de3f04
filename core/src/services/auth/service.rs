//! Main authentication service implementation

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::AccessClaims;
use crate::domain::entities::user::{normalize_email, User};
use crate::domain::value_objects::{AuthSession, RotatedSession};
use crate::errors::{AuthError, DomainError, DomainResult, ValidationError};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::token::TokenService;

use super::config::AuthServiceConfig;
use super::password::PasswordHasher;

/// Authentication service for managing the session lifecycle
pub struct AuthService<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    /// User repository for credential lookups
    user_repository: Arc<U>,
    /// Token service for access and refresh tokens
    token_service: Arc<TokenService<T, U>>,
    /// bcrypt hasher
    password_hasher: PasswordHasher,
    /// Verified against when the email is unknown, so both login failures cost the same
    decoy_hash: OnceCell<String>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U, T> AuthService<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for user data persistence
    /// * `token_service` - Service for token management
    /// * `config` - Service configuration
    pub fn new(
        user_repository: Arc<U>,
        token_service: Arc<TokenService<T, U>>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            token_service,
            password_hasher: PasswordHasher::new(config.bcrypt_cost),
            decoy_hash: OnceCell::new(),
            config,
        }
    }

    /// Token service backing this authentication service
    pub fn token_service(&self) -> &Arc<TokenService<T, U>> {
        &self.token_service
    }

    /// Register a new user
    ///
    /// The email is normalized before the uniqueness check, so `A@x.com` and
    /// `a@x.com` are the same account.
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The created user (serializes without the hash)
    /// * `Err(AuthError::DuplicateEmail)` - Email already registered
    /// * `Err(ValidationError)` - Malformed email or short password
    pub async fn register(&self, email: &str, password: &str) -> DomainResult<User> {
        let email = normalize_email(email);
        self.validate_credentials(&email, password)?;

        if self.user_repository.exists_by_email(&email).await? {
            debug!("Registration rejected: email already registered");
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = self.password_hasher.hash(password).await?;
        let user = self
            .user_repository
            .create(User::new(&email, password_hash))
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Authenticate with email and password
    ///
    /// Unknown email and wrong password produce the same error.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthSession)` - Access token, refresh token and profile
    /// * `Err(AuthError::InvalidCredentials)` - Authentication failed
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthSession> {
        let user = match self.user_repository.find_by_email(email).await? {
            Some(user) => user,
            None => {
                let decoy = self
                    .decoy_hash
                    .get_or_try_init(|| self.password_hasher.hash("decoy-password"))
                    .await?;
                let _ = self.password_hasher.verify(password, decoy).await;
                debug!("Login failed: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self
            .password_hasher
            .verify(password, &user.password_hash)
            .await?
        {
            warn!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.token_service.issue_access_token(&user)?;
        let refresh_token = self.token_service.issue_refresh_token(user.id).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthSession {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Exchange a refresh token for a new access/refresh pair
    ///
    /// Every token failure collapses to `Unauthenticated`; infrastructure
    /// failures pass through unchanged.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> DomainResult<RotatedSession> {
        let refresh_token = match refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AuthError::Unauthenticated.into()),
        };

        match self.token_service.rotate_refresh_token(refresh_token).await {
            Ok(session) => Ok(session),
            Err(DomainError::Token(e)) => {
                debug!(reason = %e, "Refresh rejected");
                Err(AuthError::Unauthenticated.into())
            }
            Err(DomainError::Auth(_)) => Err(AuthError::Unauthenticated.into()),
            Err(e) => Err(e),
        }
    }

    /// Sign out by revoking the presented refresh token
    ///
    /// Always succeeds from the caller's perspective: missing, unknown and
    /// already revoked tokens are fine, and store failures are only logged.
    pub async fn logout(&self, refresh_token: Option<&str>) -> DomainResult<()> {
        let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
            debug!("Logout without refresh token");
            return Ok(());
        };

        if let Err(e) = self.token_service.revoke_refresh_token(refresh_token).await {
            error!("Failed to revoke refresh token on logout: {}", e);
        }

        Ok(())
    }

    /// Current profile of the authenticated identity, read from the store
    ///
    /// Unlike the access token claims this reflects role or email changes
    /// made after the token was issued.
    pub async fn me(&self, claims: &AccessClaims) -> DomainResult<User> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Auth(AuthError::Unauthenticated))?;

        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::Unauthenticated.into())
    }

    fn validate_credentials(&self, email: &str, password: &str) -> Result<(), ValidationError> {
        if email.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "email".to_string(),
            });
        }
        if !is_plausible_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(ValidationError::PasswordTooShort {
                min: self.config.min_password_length,
            });
        }
        Ok(())
    }
}

/// Cheap structural check; the HTTP layer applies full validation
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
