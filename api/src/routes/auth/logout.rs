use actix_web::{web, HttpRequest, HttpResponse};

use crm_core::repositories::{TokenRepository, UserRepository};

use super::cookie::{clear_refresh_cookie, presented_refresh_token};
use crate::app::AppState;
use crate::dto::auth::{LogoutResponse, RefreshTokenRequest};
use crate::handlers::ApiError;

/// Handler for POST /api/auth/logout
///
/// Revokes the presented refresh token and clears the cookie. Always
/// answers `200 {"success": true}`, also without a token or with one that
/// was already revoked.
pub async fn logout<U, T>(
    req: HttpRequest,
    state: web::Data<AppState<U, T>>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    let body_token = body.and_then(|b| b.into_inner().refresh_token);
    let presented = presented_refresh_token(&req, &state.session, body_token);

    state
        .auth_service
        .logout(presented.as_ref().map(|(token, _)| token.as_str()))
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(clear_refresh_cookie(&state.session))
        .json(LogoutResponse { success: true }))
}
