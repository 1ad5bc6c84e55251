//! Environment-driven configuration
//!
//! The gateway is configured entirely through environment variables (a
//! `.env` file is honored in development). All values are read once at
//! startup; there is no runtime reconfiguration.

use crate::error::{AppError, Result};

/// Minimum length accepted for the cookie sealing secret.
const MIN_AUTH_KEY_LEN: usize = 32;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend scheme + host, e.g. `http://localhost:8080`
    pub base_api_domain: String,
    /// Versioned path prefix on the backend, e.g. `/api/v1`
    pub base_api_version: String,
    /// Secret sealing the session cookie
    pub auth_key: String,
    /// When false, session enforcement is bypassed (local development)
    pub auth_enabled: bool,
    /// When false, market-news routes short-circuit to an empty payload
    pub allow_fetching_market_news: bool,
    /// Listener bind host
    pub server_host: String,
    /// Listener bind port (0 picks an ephemeral port)
    pub server_port: u16,
    /// Emit the `Secure` attribute on the session cookie
    pub secure_cookies: bool,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary lookup function.
    ///
    /// Tests use this to avoid mutating process-wide environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_api_domain = lookup("BASE_API_DOMAIN")
            .ok_or_else(|| AppError::Config("BASE_API_DOMAIN is not set".to_string()))?;
        if !base_api_domain.starts_with("http://") && !base_api_domain.starts_with("https://") {
            return Err(AppError::Config(format!(
                "BASE_API_DOMAIN must include a scheme, got '{}'",
                base_api_domain
            )));
        }

        let base_api_version = lookup("BASE_API_VERSION").unwrap_or_else(|| "/api/v1".to_string());

        let auth_key = lookup("AUTH_KEY")
            .ok_or_else(|| AppError::Config("AUTH_KEY is not set".to_string()))?;
        if auth_key.len() < MIN_AUTH_KEY_LEN {
            return Err(AppError::Config(format!(
                "AUTH_KEY must be at least {} characters",
                MIN_AUTH_KEY_LEN
            )));
        }

        let auth_enabled = parse_bool(lookup("AUTH_ENABLED"), true)?;
        let allow_fetching_market_news = parse_bool(lookup("ALLOW_FETCHING_MARKET_NEWS"), true)?;
        let secure_cookies = parse_bool(lookup("SECURE_COOKIES"), false)?;

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let server_port = match lookup("SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT '{}': {}", raw, e)))?,
            None => 8686,
        };

        Ok(Self {
            base_api_domain,
            base_api_version,
            auth_key,
            auth_enabled,
            allow_fetching_market_news,
            server_host,
            server_port,
            secure_cookies,
        })
    }

    /// Composed backend base URL: domain + versioned prefix, no trailing slash.
    pub fn backend_base(&self) -> String {
        let domain = self.base_api_domain.trim_end_matches('/');
        let version = self.base_api_version.trim_end_matches('/');
        if version.is_empty() {
            domain.to_string()
        } else if version.starts_with('/') {
            format!("{}{}", domain, version)
        } else {
            format!("{}/{}", domain, version)
        }
    }

    /// Listener bind address string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_bool(raw: Option<String>, default: bool) -> Result<bool> {
    match raw.as_deref() {
        None | Some("") => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(AppError::Config(format!(
            "Expected 'true' or 'false', got '{}'",
            other
        ))),
    }
}
