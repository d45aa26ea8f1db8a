//! Cookie-backed session token.
//!
//! The bearer token lives only in an HTTP-only cookie; nothing is kept
//! server-side. The extractor rejects with 401 before the handler body
//! runs, so a guarded handler can assume a token is present. The token
//! is not validated here; a stale one surfaces as an upstream 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "github_token";
const SESSION_TTL_HOURS: i64 = 24;

/// Bearer token recovered from the session cookie.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(SESSION_COOKIE)
            .map(|cookie| Self(cookie.value().to_owned()))
            .ok_or_else(ApiError::unauthorized)
    }
}

/// 24-hour HttpOnly Lax cookie carrying the bearer token; `Secure` only
/// in production so local http development keeps working.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_TTL_HOURS))
        .build()
}
