//! Tests for the token service


use std::sync::Arc;

use crate::domain::entities::user::{Role, User};
use crate::repositories::{MockTokenRepository, MockUserRepository, UserRepository};
use crate::services::token::{TokenService, TokenServiceConfig};

pub(super) type TestTokenService = TokenService<MockTokenRepository, MockUserRepository>;

pub(super) struct Fixture {
    pub service: TestTokenService,
    pub tokens: Arc<MockTokenRepository>,
    pub users: Arc<MockUserRepository>,
}

pub(super) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: "test-secret-key-for-unit-tests".to_string(),
        ..Default::default()
    }
}

pub(super) fn fixture_with(config: TokenServiceConfig) -> Fixture {
    let tokens = Arc::new(MockTokenRepository::new());
    let users = Arc::new(MockUserRepository::new());
    let service = TokenService::new(tokens.clone(), users.clone(), config)
        .expect("Failed to create token service");
    Fixture {
        service,
        tokens,
        users,
    }
}

pub(super) fn fixture() -> Fixture {
    fixture_with(test_config())
}

pub(super) async fn seed_user(users: &MockUserRepository, email: &str, role: Role) -> User {
    users
        .create(User::with_role(email, "hash".to_string(), role))
        .await
        .unwrap()
}
