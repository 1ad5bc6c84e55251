//! Cookie-backed session store
//!
//! The session is an encrypted cookie: the browser holds the ciphertext,
//! the gateway holds the key. Nothing is stored server-side, so every
//! request re-derives the session by unsealing the `sepal_session` cookie.
//!
//! Lifecycle: created on successful login, replaced when the selected
//! portfolio changes, destroyed (expired empty cookie) on logout.

mod seal;

pub use seal::SessionSealer;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sepal_session";

/// Session lifetime. Matches the dashboard's "stay signed in" window.
pub const SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;

/// Claims sealed into the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub username: String,
    pub is_logged_in: bool,
    /// Bearer token injected into every proxied backend request.
    pub token: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Convenience preference: the portfolio the dashboard last displayed.
    #[serde(default)]
    pub selected_portfolio: Option<i64>,
    /// Unix timestamp after which the session is rejected.
    pub expires_at: i64,
}

impl SessionData {
    /// Create a fresh logged-in session for `username`.
    pub fn new(username: &str, token: &str, roles: Vec<String>) -> Self {
        Self {
            username: username.to_string(),
            is_logged_in: true,
            token: token.to_string(),
            roles,
            selected_portfolio: None,
            expires_at: Utc::now().timestamp() + SESSION_TTL_SECS,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at
    }

    /// A session is usable only while logged in, non-expired, and carrying
    /// a bearer token.
    pub fn is_valid(&self) -> bool {
        self.is_logged_in && !self.token.is_empty() && !self.is_expired()
    }
}

/// Extract the raw `sepal_session` cookie value from request headers.
pub fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let raw = match header.to_str() {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == SESSION_COOKIE {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Build the `Set-Cookie` value carrying a sealed session.
pub fn build_session_cookie(sealed: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, sealed, SESSION_TTL_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that destroys the session.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_new_session_is_valid() {
        let session = SessionData::new("s.prizio", "token-abc", vec!["TRADER".to_string()]);
        assert!(session.is_logged_in);
        assert!(session.is_valid());
        assert!(!session.is_expired());
        assert_eq!(session.selected_portfolio, None);
    }

    #[test]
    fn test_expired_session_is_invalid() {
        let mut session = SessionData::new("s.prizio", "token-abc", vec![]);
        session.expires_at = Utc::now().timestamp() - 1;
        assert!(session.is_expired());
        assert!(!session.is_valid());
    }

    #[test]
    fn test_empty_token_is_invalid() {
        let session = SessionData::new("s.prizio", "", vec![]);
        assert!(!session.is_valid());
    }

    #[test]
    fn test_cookie_value_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; sepal_session=abc.def; other=1"),
        );
        assert_eq!(session_cookie_value(&headers), Some("abc.def".to_string()));
    }

    #[test]
    fn test_cookie_value_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_cookie_value(&headers), None);
        assert_eq!(session_cookie_value(&HeaderMap::new()), None);
    }

    #[test]
    fn test_build_cookie_attributes() {
        let cookie = build_session_cookie("sealed-value", false);
        assert!(cookie.starts_with("sepal_session=sealed-value"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        let secure = build_session_cookie("sealed-value", true);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("sepal_session=;"));
    }
}
