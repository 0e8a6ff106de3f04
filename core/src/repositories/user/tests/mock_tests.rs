//! Unit tests for mock user repository

use uuid::Uuid;

use crate::domain::entities::user::{Role, User};
use crate::errors::{AuthError, DomainError};
use crate::repositories::user::{MockUserRepository, UserRepository};

#[tokio::test]
async fn test_mock_repository_create_and_find() {
    let repo = MockUserRepository::new();
    let user = User::new("owner@example.com", "hash".to_string());

    let created = repo.create(user.clone()).await.unwrap();
    assert_eq!(created.id, user.id);

    let found = repo.find_by_id(user.id).await.unwrap();
    assert_eq!(found.unwrap().email, "owner@example.com");
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_by_email_ignores_case() {
    let repo = MockUserRepository::new();
    repo.create(User::new("Owner@Example.com", "hash".to_string()))
        .await
        .unwrap();

    assert!(repo.find_by_email("OWNER@example.COM").await.unwrap().is_some());
    assert!(repo.exists_by_email("owner@example.com").await.unwrap());
    assert!(!repo.exists_by_email("other@example.com").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_email_rejected_case_insensitively() {
    let repo = MockUserRepository::new();
    repo.create(User::new("A@x.com", "hash".to_string())).await.unwrap();

    let result = repo.create(User::new("a@x.com", "hash".to_string())).await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::DuplicateEmail))
    ));
}

#[tokio::test]
async fn test_set_role() {
    let repo = MockUserRepository::new();
    let user = repo
        .create(User::new("a@x.com", "hash".to_string()))
        .await
        .unwrap();

    assert!(repo.set_role(user.id, Role::Admin).await);
    assert_eq!(
        repo.find_by_id(user.id).await.unwrap().unwrap().role,
        Role::Admin
    );
    assert!(!repo.set_role(Uuid::new_v4(), Role::Admin).await);
}
