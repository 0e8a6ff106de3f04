//! Tests for domain entities

mod user_tests;
