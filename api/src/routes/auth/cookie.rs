//! Refresh token carrier
//!
//! The refresh token travels in an HTTP-only cookie scoped to the auth
//! routes. Clients that cannot keep cookies may send it in the JSON body
//! instead; the cookie wins when both are present.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{DateTime, Utc};
use crm_core::domain::value_objects::IssuedToken;
use crm_shared::config::SessionConfig;

/// Parses the configured SameSite attribute, defaulting to `Lax`
pub fn same_site(config: &SessionConfig) -> SameSite {
    match config.same_site.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

/// Cookie carrying a freshly issued refresh token
pub fn refresh_cookie(
    config: &SessionConfig,
    token: &IssuedToken,
    now: DateTime<Utc>,
) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), token.token.clone())
        .path(config.cookie_path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(same_site(config))
        .max_age(Duration::seconds(token.seconds_until_expiry(now)))
        .finish()
}

/// Expired cookie that makes the browser drop the refresh token
pub fn clear_refresh_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), "")
        .path(config.cookie_path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(same_site(config))
        .max_age(Duration::seconds(0))
        .finish()
}

/// Where the client put its refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Cookie,
    Body,
}

/// Refresh token presented by the client, cookie first, then body
pub fn presented_refresh_token(
    req: &HttpRequest,
    config: &SessionConfig,
    body: Option<String>,
) -> Option<(String, Carrier)> {
    let from_cookie = req
        .cookie(&config.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .map(|value| (value, Carrier::Cookie));

    from_cookie.or_else(|| {
        body.filter(|value| !value.is_empty())
            .map(|value| (value, Carrier::Body))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn issued(seconds: i64, now: DateTime<Utc>) -> IssuedToken {
        IssuedToken::new("raw-token".to_string(), now + chrono::Duration::seconds(seconds))
    }

    #[test]
    fn test_refresh_cookie_attributes() {
        let now = Utc::now();
        let cookie = refresh_cookie(&SessionConfig::default(), &issued(604_800, now), now);

        assert_eq!(cookie.name(), "refreshToken");
        assert_eq!(cookie.value(), "raw-token");
        assert_eq!(cookie.path(), Some("/api/auth"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604_800)));
    }

    #[test]
    fn test_secure_and_same_site_follow_config() {
        let config = SessionConfig {
            secure: true,
            same_site: "strict".to_string(),
            ..Default::default()
        };
        let now = Utc::now();
        let cookie = refresh_cookie(&config, &issued(60, now), now);

        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_refresh_cookie(&SessionConfig::default());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn test_cookie_takes_precedence_over_body() {
        let config = SessionConfig::default();
        let req = TestRequest::default()
            .cookie(Cookie::new("refreshToken", "from-cookie"))
            .to_http_request();

        assert_eq!(
            presented_refresh_token(&req, &config, Some("from-body".to_string())),
            Some(("from-cookie".to_string(), Carrier::Cookie))
        );

        let req = TestRequest::default().to_http_request();
        assert_eq!(
            presented_refresh_token(&req, &config, Some("from-body".to_string())),
            Some(("from-body".to_string(), Carrier::Body))
        );
        assert_eq!(
            presented_refresh_token(&req, &config, Some(String::new())),
            None
        );
    }
}
