//! Register, login and protected access through the full application

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::{bearer, context, protected_routes, register, sign_in};
use crm_api::create_app;

#[actix_web::test]
async fn test_register_login_and_reach_protected_endpoint() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;

    let (access, _refresh, body) = sign_in(&app, "alice@example.com").await;
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["expiresAt"].is_string());
    assert!(body["user"].get("password_hash").is_none());

    let req = test::TestRequest::get()
        .uri("/api/leads")
        .insert_header(bearer(&access))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["role"], "user");
}

#[actix_web::test]
async fn test_register_returns_public_profile() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;

    let resp = register(&app, "Bob@Example.COM").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "bob@example.com");
    assert_eq!(body["role"], "user");
    assert!(body["id"].is_string());
    assert!(body.get("password").is_none());
}

#[actix_web::test]
async fn test_duplicate_email_is_conflict() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;

    assert_eq!(register(&app, "carol@example.com").await.status(), StatusCode::CREATED);

    for email in ["carol@example.com", "CAROL@example.com"] {
        let resp = register(&app, email).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "DUPLICATE_EMAIL");
    }
}

#[actix_web::test]
async fn test_register_rejects_invalid_input() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;

    let cases = [
        json!({ "email": "not-an-email", "password": "long-enough" }),
        json!({ "email": "dave@example.com", "password": "12345" }),
    ];
    for payload in cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;
    assert_eq!(register(&app, "erin@example.com").await.status(), StatusCode::CREATED);

    let wrong_password = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "erin@example.com", "password": "wrong-password" }))
        .to_request();
    let unknown_email = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "nobody@example.com", "password": "wrong-password" }))
        .to_request();

    let mut bodies = Vec::new();
    for req in [wrong_password, unknown_email] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(common::refresh_cookie_value(&resp).is_none());
        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["error"], "INVALID_CREDENTIALS");
}

#[actix_web::test]
async fn test_login_is_case_insensitive_on_email() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), protected_routes)).await;
    assert_eq!(register(&app, "frank@example.com").await.status(), StatusCode::CREATED);

    let resp = common::login(&app, "FRANK@Example.com").await;
    assert_eq!(resp.status(), StatusCode::OK);
}
