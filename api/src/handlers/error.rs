//! Mapping from domain errors to HTTP responses
//!
//! Every failure leaves the API as the shared `ErrorResponse` envelope.
//! Internal errors are logged with detail and answered with a generic
//! message; refresh-token failures all collapse to `UNAUTHENTICATED`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use crm_core::errors::{AuthError, DomainError, TokenError};
use crm_shared::errors::{error_codes, ErrorResponse};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error type returned by all handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request body failed DTO validation or could not be parsed
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),

    /// No route matched
    #[error("Route not found")]
    NotFound,
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Domain(DomainError::Token(err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Domain(DomainError::Auth(err))
    }
}

impl ApiError {
    /// Error code and client-facing message
    pub fn code_and_message(&self) -> (&'static str, String) {
        match self {
            ApiError::Domain(err) => domain_code_and_message(err),
            ApiError::BadRequest(message) => (error_codes::VALIDATION_ERROR, message.clone()),
            ApiError::Validation(errors) => {
                (error_codes::VALIDATION_ERROR, validation_message(errors))
            }
            ApiError::NotFound => (error_codes::NOT_FOUND, self.to_string()),
        }
    }
}

fn domain_code_and_message(err: &DomainError) -> (&'static str, String) {
    match err {
        DomainError::Auth(auth) => {
            let code = match auth {
                AuthError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
                AuthError::DuplicateEmail => error_codes::DUPLICATE_EMAIL,
                AuthError::Unauthenticated => error_codes::UNAUTHENTICATED,
            };
            (code, auth.to_string())
        }
        DomainError::Token(token) => match token {
            TokenError::MissingToken => (error_codes::MISSING_TOKEN, token.to_string()),
            TokenError::MalformedToken => (error_codes::MALFORMED_TOKEN, token.to_string()),
            TokenError::InvalidSignature => (error_codes::INVALID_SIGNATURE, token.to_string()),
            TokenError::ExpiredToken => (error_codes::EXPIRED_TOKEN, token.to_string()),
            TokenError::TokenExpired | TokenError::TokenRevoked | TokenError::TokenNotFound => (
                error_codes::UNAUTHENTICATED,
                AuthError::Unauthenticated.to_string(),
            ),
            TokenError::TokenGenerationFailed => {
                (error_codes::INTERNAL_ERROR, INTERNAL_MESSAGE.to_string())
            }
        },
        DomainError::Validation(validation) => {
            (error_codes::VALIDATION_ERROR, validation.to_string())
        }
        DomainError::Internal { .. } => (error_codes::INTERNAL_ERROR, INTERNAL_MESSAGE.to_string()),
    }
}

/// First failing field, rendered for humans
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for {}", field),
            })
        })
        .unwrap_or_else(|| "Invalid request".to_string())
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(err) => match err {
                DomainError::Auth(AuthError::DuplicateEmail) => StatusCode::CONFLICT,
                DomainError::Auth(_) => StatusCode::UNAUTHORIZED,
                DomainError::Token(TokenError::TokenGenerationFailed) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                DomainError::Token(_) => StatusCode::UNAUTHORIZED,
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let (code, message) = self.code_and_message();
        HttpResponse::build(status).json(ErrorResponse::new(code, message))
    }
}

/// JSON body errors become `400 VALIDATION_ERROR` instead of actix's text/plain default
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid request body: {}", err)).into()
}
