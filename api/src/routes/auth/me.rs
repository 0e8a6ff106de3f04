use actix_web::{web, HttpResponse};

use crm_core::repositories::{TokenRepository, UserRepository};

use crate::app::AppState;
use crate::dto::auth::UserResponse;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/auth/me
///
/// Reads the profile from the store rather than the token claims, so a
/// role change shows up here before the access token expires.
///
/// ## Errors
/// - 401 Unauthorized: Gate rejection, or the user no longer exists
pub async fn me<U, T>(
    state: web::Data<AppState<U, T>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    let user = state.auth_service.me(&auth.claims).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
