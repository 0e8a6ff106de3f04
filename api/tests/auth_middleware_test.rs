//! The JWT gate in front of collaborator endpoints and `/api/auth/me`

mod common;

use actix_web::{http::header, http::StatusCode, test};
use serde_json::Value;

use common::{auth_config, bearer, context, context_with, protected_routes, sign_in};
use crm_api::create_app;
use crm_core::domain::entities::user::Role;
use crm_shared::config::{AuthConfig, JwtConfig};

async fn error_code<B: actix_web::body::MessageBody>(
    resp: actix_web::dev::ServiceResponse<B>,
) -> String {
    let body: Value = test::read_body_json(resp).await;
    body["error"].as_str().unwrap_or_default().to_string()
}

#[actix_web::test]
async fn test_missing_header_is_rejected() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;

    let req = test::TestRequest::get().uri("/api/leads").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp).await, "MISSING_TOKEN");
}

#[actix_web::test]
async fn test_non_bearer_scheme_counts_as_missing() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/leads")
        .insert_header((header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp).await, "MISSING_TOKEN");
}

#[actix_web::test]
async fn test_tampered_signature_is_rejected() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;
    let (access, _, _) = sign_in(&app, "grace@example.com").await;

    // Flip the first signature character; it carries only data bits
    let signature_start = access.rfind('.').unwrap() + 1;
    let mut tampered = access.into_bytes();
    tampered[signature_start] = if tampered[signature_start] == b'A' { b'Q' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/leads")
        .insert_header(bearer(&tampered))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp).await, "INVALID_SIGNATURE");
}

#[actix_web::test]
async fn test_garbage_token_is_malformed() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/leads")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp).await, "MALFORMED_TOKEN");
}

#[actix_web::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let other = context_with(AuthConfig {
        jwt: JwtConfig::new("a-different-secret"),
        ..auth_config()
    });
    let other_app = test::init_service(create_app(other.state.clone(), protected_routes)).await;
    let (foreign_access, _, _) = sign_in(&other_app, "heidi@example.com").await;

    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;
    let req = test::TestRequest::get()
        .uri("/api/leads")
        .insert_header(bearer(&foreign_access))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp).await, "INVALID_SIGNATURE");
}

#[actix_web::test]
async fn test_me_reads_current_role_while_gate_uses_claims() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;
    let (access, _, body) = sign_in(&app, "ivan@example.com").await;

    let user_id = body["user"]["id"].as_str().unwrap().parse().unwrap();
    assert!(ctx.users.set_role(user_id, Role::Admin).await);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&access))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["role"], "admin");
    assert_eq!(me["email"], "ivan@example.com");

    // The gate trusts the token until it is reissued
    let req = test::TestRequest::get()
        .uri("/api/leads")
        .insert_header(bearer(&access))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let leads: Value = test::read_body_json(resp).await;
    assert_eq!(leads["role"], "user");
}

#[actix_web::test]
async fn test_me_requires_token() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp).await, "MISSING_TOKEN");
}
