use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crm_core::repositories::{TokenRepository, UserRepository};

use super::cookie::{presented_refresh_token, refresh_cookie, Carrier};
use crate::app::AppState;
use crate::dto::auth::{RefreshResponse, RefreshTokenRequest};
use crate::handlers::ApiError;

/// Handler for POST /api/auth/refresh-token
///
/// Rotates the presented refresh token (cookie, or `refreshToken` in the
/// body) and replaces the cookie with the new one. Body clients also get the
/// new refresh token back in the body.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "accessToken": "eyJ...", "expiresAt": "2025-01-01T00:15:00Z" }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: `UNAUTHENTICATED` for a missing, unknown, expired,
///   revoked or already rotated refresh token
pub async fn refresh<U, T>(
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

    let carrier = presented.as_ref().map(|(_, carrier)| *carrier);

    let rotated = state
        .auth_service
        .refresh(presented.as_ref().map(|(token, _)| token.as_str()))
        .await?;

    let cookie = refresh_cookie(&state.session, &rotated.refresh_token, Utc::now());
    let refresh_token = match carrier {
        Some(Carrier::Body) => Some(rotated.refresh_token.token),
        _ => None,
    };
    Ok(HttpResponse::Ok().cookie(cookie).json(RefreshResponse {
        access_token: rotated.access_token.token,
        expires_at: rotated.access_token.expires_at,
        refresh_token,
    }))
}
