//! Authentication route handlers
//!
//! This module contains all authentication-related endpoints:
//! - Registration and login
//! - Refresh token rotation
//! - Logout
//! - Current profile (`me`), behind the JWT gate

pub mod cookie;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;

use actix_web::web;
use crm_core::repositories::{TokenRepository, UserRepository};

use crate::middleware::auth::JwtAuth;

/// Mounts the `/auth` scope
pub fn scope<U, T>(jwt: JwtAuth) -> actix_web::Scope
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    web::scope("/auth")
        .route("/register", web::post().to(register::register::<U, T>))
        .route("/login", web::post().to(login::login::<U, T>))
        .route("/refresh-token", web::post().to(refresh::refresh::<U, T>))
        .route("/logout", web::post().to(logout::logout::<U, T>))
        .service(
            web::resource("/me")
                .wrap(jwt)
                .route(web::get().to(me::me::<U, T>)),
        )
}
