//! Session token extraction from HTTP requests

use axum::http::{
    HeaderMap,
    header::{AUTHORIZATION, COOKIE},
};
use serde::{Deserialize, Serialize};

use crate::token::Claims;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "access_token";

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

impl AuthUser {
    /// Create from token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email.clone(),
        }
    }
}

/// Extract bearer token from authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extract the session cookie value
fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}

/// Find the session token a request presents.
///
/// The `Authorization: Bearer` header wins over the `access_token` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));

        assert_eq!(session_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi; lang=en"),
        );

        assert_eq!(session_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("access_token=from-cookie"));

        assert_eq!(session_token(&headers), Some("from-header"));
    }

    #[test]
    fn test_absent_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        headers.insert(COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_auth_user_from_claims() {
        let claims = Claims {
            id: 42,
            email: "jane@example.com".to_string(),
            iat: None,
            exp: None,
        };

        let user = AuthUser::from_claims(&claims);
        assert_eq!(user.id, 42);
        assert_eq!(user.email, "jane@example.com");
    }
}
