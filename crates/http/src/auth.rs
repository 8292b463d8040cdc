//! Cookie-session authentication for module routes.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use libris_authz::SessionStore;
use libris_kernel::IdentityContext;

use crate::error::AppError;

/// The logged-in administrator. Rejects the request with 401 when the
/// session cookie is missing, unknown, or expired.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub IdentityContext);

impl<S> FromRequestParts<S> for CurrentAdmin
where
    Arc<SessionStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Arc::<SessionStore>::from_ref(state);

        let token = session_token(&parts.headers, sessions.cookie_name())
            .ok_or_else(|| AppError::unauthorized("authentication required"))?;

        let identity = sessions
            .resolve(&token)
            .await
            .ok_or_else(|| AppError::unauthorized("session expired or unknown"))?;

        Ok(Self(identity))
    }
}

/// Value of the named cookie, if the request carries it.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value that installs a session token.
pub fn session_cookie(cookie_name: &str, token: &str, max_age_secs: i64) -> HeaderValue {
    let cookie = format!(
        "{cookie_name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// `Set-Cookie` value that removes the session cookie.
pub fn cleared_cookie(cookie_name: &str) -> HeaderValue {
    let cookie = format!("{cookie_name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; libris_session=abc123; lang=en"),
        );

        assert_eq!(
            session_token(&headers, "libris_session").as_deref(),
            Some("abc123")
        );
        assert_eq!(session_token(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("libris_session="));
        assert_eq!(session_token(&headers, "libris_session"), None);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("libris_session", "tok", 60);
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("libris_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(cleared_cookie("libris_session")
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));
    }
}
