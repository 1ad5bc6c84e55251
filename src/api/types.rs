//! API request and response types

use serde::{Deserialize, Serialize};

/// Standard response envelope: `{"success":..,"message":..,"data":..}`.
///
/// The same shape the backend speaks, so payloads relayed by the proxy and
/// payloads built by the gateway are indistinguishable to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
        }
    }

    pub fn success_with_message(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn success_with_data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            data: None,
        }
    }
}

/// Empty data type for responses without data
#[derive(Debug, Clone, Serialize)]
pub struct Empty {}

/// Body of `POST /api/security/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `PUT /api/security/portfolio`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPortfolioRequest {
    /// `None` clears the preference.
    pub portfolio_id: Option<i64>,
}

/// Session claims exposed by `GET /api/security/me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub username: String,
    pub is_logged_in: bool,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_portfolio: Option<i64>,
}

/// Payload of `GET /api/account/active`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<crate::models::Portfolio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<crate::models::Account>,
    /// True when resolution failed and the dashboard should navigate back
    /// to its default selection.
    pub redirect: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let response = ApiResponse::success_with_data(serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["data"]["id"], 1);

        let response = ApiResponse::<Empty>::error("nope");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "nope");
    }
}
