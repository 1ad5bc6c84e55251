//! Shared application state

use crate::backend::BackendClient;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::session::{self, SessionData, SessionSealer};
use axum::http::HeaderMap;
use std::sync::Arc;

/// State shared across all route handlers.
///
/// Everything in here is immutable after startup; per-request state lives in
/// the session cookie, so handlers stay stateless and independent.
pub struct AppState {
    pub config: AppConfig,
    pub backend: BackendClient,
    pub sealer: SessionSealer,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let backend = BackendClient::new(&config);
        let sealer = SessionSealer::new(&config.auth_key);
        Arc::new(Self {
            config,
            backend,
            sealer,
        })
    }

    /// Unseal the session carried by the request, if any.
    ///
    /// Malformed or tampered cookies are treated the same as no cookie.
    pub fn session(&self, headers: &HeaderMap) -> Option<SessionData> {
        let cookie = session::session_cookie_value(headers)?;
        match self.sealer.unseal(&cookie) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!("Discarding unusable session cookie: {}", e);
                None
            }
        }
    }

    /// Enforce session presence on a protected route.
    ///
    /// Returns the session claims, or `None` when `AUTH_ENABLED=false`
    /// bypasses enforcement (local development against an anonymous
    /// backend). Missing, invalid, or expired sessions are 401s.
    pub fn require_session(&self, headers: &HeaderMap) -> Result<Option<SessionData>> {
        if !self.config.auth_enabled {
            return Ok(None);
        }
        match self.session(headers) {
            Some(session) if session.is_valid() => Ok(Some(session)),
            _ => Err(AppError::Auth("Unauthorized".to_string())),
        }
    }
}
