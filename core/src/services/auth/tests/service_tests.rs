//! Unit tests for authentication service

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entities::user::Role;
use crate::errors::{AuthError, DomainError, TokenError, ValidationError};
use crate::repositories::{MockTokenRepository, MockUserRepository, TokenRepository};
use crate::services::auth::{AuthService, AuthServiceConfig};
use crate::services::token::{hash_refresh_token, TokenService, TokenServiceConfig};

type TestAuthService = AuthService<MockUserRepository, MockTokenRepository>;

struct Fixture {
    service: TestAuthService,
    users: Arc<MockUserRepository>,
    tokens: Arc<MockTokenRepository>,
}

fn fixture() -> Fixture {
    let users = Arc::new(MockUserRepository::new());
    let tokens = Arc::new(MockTokenRepository::new());
    let token_service = Arc::new(
        TokenService::new(
            tokens.clone(),
            users.clone(),
            TokenServiceConfig {
                jwt_secret: "auth-service-test-secret".to_string(),
                ..Default::default()
            },
        )
        .unwrap(),
    );
    let service = AuthService::new(
        users.clone(),
        token_service,
        AuthServiceConfig {
            bcrypt_cost: 4,
            ..Default::default()
        },
    );
    Fixture {
        service,
        users,
        tokens,
    }
}

#[tokio::test]
async fn test_register_creates_user_with_hashed_password() {
    let f = fixture();

    let user = f.service.register("New@Example.com", "secret123").await.unwrap();

    assert_eq!(user.email, "new@example.com");
    assert_eq!(user.role, Role::User);
    assert_ne!(user.password_hash, "secret123");
    assert!(user.password_hash.starts_with("$2"));
}

#[tokio::test]
async fn test_register_duplicate_email_case_insensitive() {
    let f = fixture();
    f.service.register("A@x.com", "secret123").await.unwrap();

    let result = f.service.register("a@x.com", "another1").await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::DuplicateEmail))
    ));
}

#[tokio::test]
async fn test_register_validates_input() {
    let f = fixture();

    assert!(matches!(
        f.service.register("not-an-email", "secret123").await,
        Err(DomainError::Validation(ValidationError::InvalidEmail))
    ));
    assert!(matches!(
        f.service.register("a@x.com", "12345").await,
        Err(DomainError::Validation(ValidationError::PasswordTooShort { min: 6 }))
    ));
    assert!(matches!(
        f.service.register("  ", "secret123").await,
        Err(DomainError::Validation(ValidationError::RequiredField { .. }))
    ));
}

#[tokio::test]
async fn test_login_then_verify_matches_registered_identity() {
    let f = fixture();
    let user = f.service.register("owner@example.com", "secret123").await.unwrap();

    let session = f.service.login("OWNER@example.com", "secret123").await.unwrap();

    let claims = f
        .service
        .token_service()
        .verify_access_token(&session.access_token.token)
        .unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.email, "owner@example.com");
    assert_eq!(claims.role, Role::User);
    assert_eq!(session.user.id, user.id);

    let stored = f
        .tokens
        .find_refresh_token(&hash_refresh_token(&session.refresh_token.token))
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let f = fixture();
    f.service.register("owner@example.com", "secret123").await.unwrap();

    let unknown = f.service.login("nobody@example.com", "secret123").await.unwrap_err();
    let wrong = f.service.login("owner@example.com", "wrong-password").await.unwrap_err();

    assert_eq!(unknown.to_string(), wrong.to_string());
    assert!(matches!(unknown, DomainError::Auth(AuthError::InvalidCredentials)));
    assert!(matches!(wrong, DomainError::Auth(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_refresh_rotates_and_collapses_failures() {
    let f = fixture();
    f.service.register("owner@example.com", "secret123").await.unwrap();
    let session = f.service.login("owner@example.com", "secret123").await.unwrap();

    let rotated = f
        .service
        .refresh(Some(&session.refresh_token.token))
        .await
        .unwrap();
    assert!(f
        .service
        .token_service()
        .verify_access_token(&rotated.access_token.token)
        .is_ok());

    for presented in [
        Some(session.refresh_token.token.as_str()),
        Some("never-issued"),
        Some(""),
        None,
    ] {
        assert!(matches!(
            f.service.refresh(presented).await,
            Err(DomainError::Auth(AuthError::Unauthenticated))
        ));
    }
}

#[tokio::test]
async fn test_logout_is_idempotent_and_never_resurrects() {
    let f = fixture();
    f.service.register("owner@example.com", "secret123").await.unwrap();
    let session = f.service.login("owner@example.com", "secret123").await.unwrap();
    let token = session.refresh_token.token.as_str();

    assert!(f.service.logout(Some(token)).await.is_ok());
    assert!(f.service.logout(Some(token)).await.is_ok());
    assert!(f.service.logout(Some("unknown")).await.is_ok());
    assert!(f.service.logout(None).await.is_ok());

    let stored = f
        .tokens
        .find_refresh_token(&hash_refresh_token(token))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.revoked);
    assert!(matches!(
        f.service.token_service().rotate_refresh_token(token).await,
        Err(DomainError::Token(TokenError::TokenRevoked))
    ));
}

#[tokio::test]
async fn test_me_reads_fresh_profile() {
    let f = fixture();
    let user = f.service.register("owner@example.com", "secret123").await.unwrap();
    let session = f.service.login("owner@example.com", "secret123").await.unwrap();
    let claims = f
        .service
        .token_service()
        .verify_access_token(&session.access_token.token)
        .unwrap();

    f.users.set_role(user.id, Role::Admin).await;

    // The token still carries the old role; the profile lookup does not
    assert_eq!(claims.role, Role::User);
    assert_eq!(f.service.me(&claims).await.unwrap().role, Role::Admin);
}

#[tokio::test]
async fn test_me_for_unknown_user_is_unauthenticated() {
    let f = fixture();
    let ghost = crate::domain::entities::user::User::new("ghost@example.com", "hash".to_string());
    let issued = f.service.token_service().issue_access_token(&ghost).unwrap();
    let claims = f
        .service
        .token_service()
        .verify_access_token_at(&issued.token, Utc::now())
        .unwrap();

    assert!(matches!(
        f.service.me(&claims).await,
        Err(DomainError::Auth(AuthError::Unauthenticated))
    ));
}
