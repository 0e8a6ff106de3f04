use actix_web::{web, HttpResponse};
use chrono::Utc;
use validator::Validate;

use crm_core::repositories::{TokenRepository, UserRepository};

use super::cookie::refresh_cookie;
use crate::app::AppState;
use crate::dto::auth::{LoginRequest, LoginResponse, UserResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/auth/login
///
/// Returns the access token in the body and sets the refresh token cookie.
///
/// ## Errors
/// - 401 Unauthorized: `INVALID_CREDENTIALS` for unknown email and wrong
///   password alike
pub async fn login<U, T>(
    state: web::Data<AppState<U, T>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    request.validate()?;

    let session = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    let cookie = refresh_cookie(&state.session, &session.refresh_token, Utc::now());
    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        access_token: session.access_token.token,
        expires_at: session.access_token.expires_at,
        user: UserResponse::from(&session.user),
    }))
}
