//! Checks on the startup DDL

use crate::database::schema::{CREATE_REFRESH_TOKENS, CREATE_USERS, STATEMENTS};

#[test]
fn test_users_table_precedes_refresh_tokens() {
    assert_eq!(STATEMENTS[0], CREATE_USERS);
    assert_eq!(STATEMENTS[1], CREATE_REFRESH_TOKENS);
}

#[test]
fn test_statements_are_idempotent() {
    for statement in STATEMENTS {
        assert!(statement.contains("CREATE TABLE IF NOT EXISTS"));
    }
}

#[test]
fn test_refresh_tokens_store_hash_only() {
    assert!(CREATE_REFRESH_TOKENS.contains("token_hash CHAR(64) NOT NULL"));
    assert!(CREATE_REFRESH_TOKENS.contains("UNIQUE KEY uq_refresh_tokens_hash"));
    assert!(CREATE_REFRESH_TOKENS.contains("replaced_by CHAR(36) NULL"));
    assert!(CREATE_USERS.contains("UNIQUE KEY uq_users_email"));
}
