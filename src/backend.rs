//! Trading-journal backend client
//!
//! The single outbound HTTP adapter. Everything the gateway knows about the
//! backend goes through here: the health probe, the credential exchange on
//! login, and the generic bearer-authenticated forward used by the proxy
//! routes. One forward per request, no retries.

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::models::User;
use axum::body::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// Envelope shape the backend wraps every JSON payload in.
#[derive(Debug, Deserialize)]
struct BackendEnvelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    token: String,
    user: User,
}

/// Response relayed back to the dashboard by the proxy routes.
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Bytes,
}

impl ProxiedResponse {
    /// Whether the payload should be relayed as JSON rather than raw bytes.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false)
    }
}

/// HTTP client for the trading-journal backend.
pub struct BackendClient {
    client: Client,
    /// Scheme + host, no version prefix. Health lives here.
    domain: String,
    /// Domain + versioned prefix. All API traffic lives here.
    base: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            domain: config.base_api_domain.trim_end_matches('/').to_string(),
            base: config.backend_base(),
        }
    }

    /// Backend base URL the proxy mapping resolves against.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Probe the backend health endpoint. Reachable and 2xx means healthy.
    pub async fn health(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.domain))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Backend health probe failed: {}", e);
                false
            }
        }
    }

    /// Exchange credentials for a bearer token and the user profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User)> {
        let response = self
            .client
            .post(format!("{}/security/login", self.base))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        let status = response.status();
        let result: BackendEnvelope<LoginData> = response.json().await?;

        if !status.is_success() || !result.success {
            return Err(AppError::Auth(
                result
                    .message
                    .unwrap_or_else(|| "Invalid username or password".to_string()),
            ));
        }

        let data = result
            .data
            .ok_or_else(|| AppError::Auth("No data in login response".to_string()))?;

        Ok((data.token, data.user))
    }

    /// Invalidate the bearer token on the backend.
    ///
    /// Best effort: the cookie is the session's source of truth and is
    /// destroyed by the caller regardless of the outcome here.
    pub async fn logout(&self, token: &str) {
        let result = self
            .client
            .post(format!("{}/security/logout", self.base))
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await;

        if let Err(e) = result {
            warn!("Backend logout failed, destroying cookie anyway: {}", e);
        }
    }

    /// Forward a request to an already-resolved backend URL.
    ///
    /// Copies the method and body, preserves the inbound content type, and
    /// injects the bearer token when one is present. A single best-effort
    /// call: network failures surface as `AppError::Http` and become 500s.
    pub async fn forward(
        &self,
        method: Method,
        url: &str,
        content_type: Option<&str>,
        body: Bytes,
        bearer: Option<&str>,
    ) -> Result<ProxiedResponse> {
        let mut request = self
            .client
            .request(method, url)
            .header("X-Request-Id", Uuid::new_v4().to_string());

        if let Some(ct) = content_type {
            request = request.header(CONTENT_TYPE, ct);
        }
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;

        let status = response.status().as_u16();
        let content_type = header_string(&response, CONTENT_TYPE);
        let content_disposition = header_string(&response, CONTENT_DISPOSITION);
        let body = response.bytes().await?;

        Ok(ProxiedResponse {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}

fn header_string(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxied(content_type: Option<&str>) -> ProxiedResponse {
        ProxiedResponse {
            status: 200,
            content_type: content_type.map(|ct| ct.to_string()),
            content_disposition: None,
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_json_detection() {
        assert!(proxied(Some("application/json")).is_json());
        assert!(proxied(Some("application/json; charset=utf-8")).is_json());
        assert!(!proxied(Some("text/csv")).is_json());
        assert!(!proxied(None).is_json());
    }
}
