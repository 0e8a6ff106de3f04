use actix_web::{web, HttpResponse};
use validator::Validate;

use crm_core::repositories::{TokenRepository, UserRepository};

use crate::app::AppState;
use crate::dto::auth::{RegisterRequest, UserResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/auth/register
///
/// # Request Body
///
/// ```json
/// { "email": "a@example.com", "password": "secret1" }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// { "id": "…", "email": "a@example.com", "role": "user" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Invalid email or password shorter than 6 characters
/// - 409 Conflict: Email already registered (case-insensitive)
pub async fn register<U, T>(
    state: web::Data<AppState<U, T>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    request.validate()?;

    let user = state
        .auth_service
        .register(&request.email, &request.password)
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}
