//! Unit tests for user entity

use crate::domain::entities::user::{normalize_email, Role, User};

#[test]
fn test_new_user_is_normalized_with_default_role() {
    let user = User::new("  Jane.Doe@Example.COM ", "hash".to_string());

    assert_eq!(user.email, "jane.doe@example.com");
    assert_eq!(user.role, Role::User);
    assert!(!user.is_admin());
}

#[test]
fn test_normalize_email() {
    assert_eq!(normalize_email("A@X.com"), "a@x.com");
    assert_eq!(normalize_email("a@x.com"), normalize_email("A@x.COM"));
}

#[test]
fn test_role_parsing_and_display() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
    assert!("superuser".parse::<Role>().is_err());
    assert_eq!(Role::Admin.to_string(), "admin");
}

#[test]
fn test_password_hash_is_never_serialized() {
    let user = User::new("a@x.com", "secret-hash".to_string());
    let json = serde_json::to_value(&user).unwrap();

    assert!(json.get("password_hash").is_none());
    assert_eq!(json["role"], "user");
}
