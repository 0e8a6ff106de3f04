//! JWT authentication middleware for protecting API endpoints.
//!
//! Extracts the bearer token from the Authorization header, verifies it
//! through the core `AccessTokenVerifier` and injects the identity into the
//! request extensions. Verification never touches the store, so a role
//! change is only visible here once a new access token has been issued.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use crm_core::domain::entities::token::AccessClaims;
use crm_core::domain::entities::user::Role;
use crm_core::errors::{AuthError, TokenError};
use crm_core::services::AccessTokenVerifier;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use crate::handlers::ApiError;

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// User ID extracted from JWT claims
    pub user_id: Uuid,
    /// Email at token issuance
    pub email: String,
    /// Role at token issuance
    pub role: Role,
    /// JWT ID for tracking
    pub jti: String,
    /// Full claims, for handlers that need them
    pub claims: AccessClaims,
}

impl AuthContext {
    /// Creates a new authentication context from verified claims
    pub fn from_claims(claims: AccessClaims) -> Result<Self, TokenError> {
        let user_id = claims.user_id().map_err(|_| TokenError::MalformedToken)?;
        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role: claims.role,
            jti: claims.jti.clone(),
            claims,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    verifier: Arc<dyn AccessTokenVerifier>,
}

impl JwtAuth {
    /// Creates a new JWT authentication middleware backed by `verifier`
    pub fn new(verifier: Arc<dyn AccessTokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn AccessTokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verified = authenticate(self.verifier.as_ref(), req.headers());

        Box::pin(async move {
            let auth_context = match verified {
                Ok(context) => context,
                Err(e) => {
                    tracing::debug!(reason = %e, path = %req.path(), "Rejected unauthenticated request");
                    let response = ApiError::from(e).error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(auth_context);
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Runs the gate's transition: no bearer token is `MissingToken`, any
/// verification failure keeps the request unauthenticated
pub fn authenticate(
    verifier: &dyn AccessTokenVerifier,
    headers: &HeaderMap,
) -> Result<AuthContext, TokenError> {
    let token = extract_bearer_token(headers).ok_or(TokenError::MissingToken)?;
    let claims = verifier.verify_access_token(token)?;
    AuthContext::from_claims(claims)
}

/// Extracts Bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::from(AuthError::Unauthenticated).into());

        ready(result)
    }
}
