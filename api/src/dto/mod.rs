pub mod auth;

pub use auth::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshResponse, RefreshTokenRequest,
    RegisterRequest, UserResponse,
};
