//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::header,
    test, web, HttpResponse,
};
use serde_json::{json, Value};

use crm_api::middleware::AuthContext;
use crm_api::AppState;
use crm_core::repositories::{MockTokenRepository, MockUserRepository};
use crm_core::services::{AuthService, AuthServiceConfig, TokenService, TokenServiceConfig};
use crm_shared::config::{AuthConfig, CorsConfig, JwtConfig, SessionConfig};

pub const PASSWORD: &str = "correct-horse";

pub struct TestContext {
    pub state: web::Data<AppState<MockUserRepository, MockTokenRepository>>,
    pub users: Arc<MockUserRepository>,
    pub tokens: Arc<MockTokenRepository>,
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt: JwtConfig::new("integration-test-secret"),
        bcrypt_cost: 4,
        ..Default::default()
    }
}

pub fn context() -> TestContext {
    context_with(auth_config())
}

pub fn context_with(config: AuthConfig) -> TestContext {
    let users = Arc::new(MockUserRepository::new());
    let tokens = Arc::new(MockTokenRepository::new());

    let token_service = Arc::new(
        TokenService::new(
            tokens.clone(),
            users.clone(),
            TokenServiceConfig::from(&config),
        )
        .expect("token service"),
    );
    let auth_service = Arc::new(AuthService::new(
        users.clone(),
        token_service,
        AuthServiceConfig::from(&config),
    ));

    let state = web::Data::new(AppState::new(
        auth_service,
        SessionConfig::default(),
        CorsConfig::default(),
    ));

    TestContext {
        state,
        users,
        tokens,
    }
}

/// Stand-in for a business endpoint mounted behind the gate
pub fn protected_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/leads", web::get().to(list_leads));
}

async fn list_leads(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "owner": auth.user_id,
        "role": auth.role,
    }))
}

pub async fn register<S, B>(app: &S, email: &str) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    test::call_service(app, req).await
}

pub async fn login<S, B>(app: &S, email: &str) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    test::call_service(app, req).await
}

/// Registers and logs in, returning the access token, the refresh cookie
/// value and the login body
pub async fn sign_in<S, B>(app: &S, email: &str) -> (String, String, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = register(app, email).await;
    assert_eq!(resp.status(), 201);

    let resp = login(app, email).await;
    assert_eq!(resp.status(), 200);
    let refresh = refresh_cookie_value(&resp).expect("refresh cookie");
    let body: Value = test::read_body_json(resp).await;
    let access = body["accessToken"].as_str().expect("access token").to_string();

    (access, refresh, body)
}

pub fn refresh_cookie_value<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "refreshToken")
        .map(|c| c.value().to_string())
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
