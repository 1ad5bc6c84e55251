//! Gateway endpoint handlers
//!
//! Session lifecycle under `/api/security/*`, typed account routes under
//! `/api/account/*`, and the catch-all proxy under `/api/proxy/*`.

use crate::api::types::{
    ActiveSelection, ApiResponse, Empty, LoginRequest, MeResponse, SelectPortfolioRequest,
};
use crate::error::{AppError, Result};
use crate::models::Portfolio;
use crate::proxy;
use crate::services::{
    AccountSelector, AccountService, NewsService, PortfolioSelector, TradeFilter,
};
use crate::session::{build_session_cookie, clear_session_cookie, SessionData};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Json, Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use reqwest::Method as OutboundMethod;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Trade routes whose query parameters form a filter worth validating
/// before they reach the backend.
const FILTERED_TRADE_ROUTES: &[&str] =
    &["/trade/get-all", "/trade/get-paged", "/trade/for-interval"];

// ============================================================================
// Health & maintenance
// ============================================================================

/// GET /health — gateway liveness plus a backend reachability snapshot.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let backend_up = state.backend.health().await;
    Json(ApiResponse::success_with_data(serde_json::json!({
        "gateway": "up",
        "backend": if backend_up { "up" } else { "down" },
    })))
}

/// GET /maintenance — the page the health gate redirects to during outages.
pub async fn maintenance() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(
            "<html><body><h1>Down for maintenance</h1>\
             <p>The trading journal is temporarily unavailable. \
             Please check back shortly.</p></body></html>",
        ),
    )
}

// ============================================================================
// Session lifecycle
// ============================================================================

/// POST /api/security/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let (token, user) = state.backend.login(body.username.trim(), &body.password).await?;

    let session = SessionData::new(&user.username, &token, user.roles.clone());
    let sealed = state.sealer.seal(&session)?;
    let cookie = build_session_cookie(&sealed, state.config.secure_cookies);

    info!("User {} logged in", user.username);

    let mut response = Json(ApiResponse::success_with_data(user)).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, header_value(&cookie)?);
    Ok(response)
}

/// POST /api/security/logout
///
/// Destroys the cookie unconditionally; the backend token invalidation is
/// best effort.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    if let Some(session) = state.session(&headers) {
        info!("User {} logged out", session.username);
        state.backend.logout(&session.token).await;
    }

    let cookie = clear_session_cookie(state.config.secure_cookies);
    let mut response =
        Json(ApiResponse::<Empty>::success_with_message("Logged out")).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, header_value(&cookie)?);
    Ok(response)
}

/// GET /api/security/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<MeResponse>>> {
    let session = state
        .session(&headers)
        .filter(SessionData::is_valid)
        .ok_or_else(|| AppError::Auth("Unauthorized".to_string()))?;

    Ok(Json(ApiResponse::success_with_data(MeResponse {
        username: session.username,
        is_logged_in: session.is_logged_in,
        roles: session.roles,
        selected_portfolio: session.selected_portfolio,
    })))
}

/// PUT /api/security/portfolio — reseal the cookie with a new
/// selected-portfolio preference.
pub async fn select_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SelectPortfolioRequest>,
) -> Result<Response> {
    let mut session = state
        .session(&headers)
        .filter(SessionData::is_valid)
        .ok_or_else(|| AppError::Auth("Unauthorized".to_string()))?;

    session.selected_portfolio = body.portfolio_id;
    let sealed = state.sealer.seal(&session)?;
    let cookie = build_session_cookie(&sealed, state.config.secure_cookies);

    let mut response =
        Json(ApiResponse::<Empty>::success_with_message("Portfolio updated")).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, header_value(&cookie)?);
    Ok(response)
}

// ============================================================================
// Typed account routes
// ============================================================================

/// POST /api/account/create
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response> {
    let session = state.require_session(&headers)?;
    let url = format!("{}/account/create", state.backend.base());
    forward_json(&state, OutboundMethod::POST, &url, Some(body), session).await
}

/// PUT /api/account/update?accountNumber=..
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<Response> {
    let session = state.require_session(&headers)?;
    let account_number = required_param(&query, "accountNumber")?;
    let url = format!(
        "{}/account/update?accountNumber={}",
        state.backend.base(),
        urlencoding::encode(&account_number)
    );
    forward_json(&state, OutboundMethod::PUT, &url, Some(body), session).await
}

/// DELETE /api/account/delete?accountNumber=..
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response> {
    let session = state.require_session(&headers)?;
    let account_number = required_param(&query, "accountNumber")?;
    let url = format!(
        "{}/account/delete?accountNumber={}",
        state.backend.base(),
        urlencoding::encode(&account_number)
    );
    forward_json(&state, OutboundMethod::DELETE, &url, None, session).await
}

/// GET /api/account/active?account=<id|default>&portfolio=<id|default>
///
/// Fetches the user's portfolios from the backend and resolves the active
/// selection. A failed resolution is not an error: the payload carries a
/// redirect hint and the dashboard navigates back to its defaults.
pub async fn active_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<ActiveSelection>>> {
    let session = state.require_session(&headers)?;

    let portfolio_selector = match query.get("portfolio").map(String::as_str) {
        None | Some("") => PortfolioSelector::Default,
        Some(raw) => PortfolioSelector::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("Invalid portfolio '{}'", raw)))?,
    };
    let account_selector = match query.get("account").map(String::as_str) {
        None | Some("") => AccountSelector::Default,
        Some(raw) => AccountSelector::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("Invalid account '{}'", raw)))?,
    };

    let url = format!("{}/portfolio/get-all", state.backend.base());
    let bearer = session.as_ref().map(|s| s.token.clone());
    let proxied = state
        .backend
        .forward(
            OutboundMethod::GET,
            &url,
            None,
            Bytes::new(),
            bearer.as_deref(),
        )
        .await?;

    if proxied.status != StatusCode::OK.as_u16() {
        return Err(AppError::Backend(format!(
            "Portfolio lookup failed with status {}",
            proxied.status
        )));
    }

    let envelope: Value = serde_json::from_slice(&proxied.body)?;
    let portfolios: Vec<Portfolio> =
        serde_json::from_value(envelope.get("data").cloned().unwrap_or(Value::Null))
            .unwrap_or_default();

    let preferred = session.as_ref().and_then(|s| s.selected_portfolio);
    let portfolio =
        AccountService::resolve_portfolio(&portfolios, portfolio_selector, preferred);
    let account =
        portfolio.and_then(|p| AccountService::resolve_account(p, account_selector));

    let selection = ActiveSelection {
        redirect: portfolio.is_none() || account.is_none(),
        portfolio: portfolio.cloned(),
        account: account.cloned(),
    };
    Ok(Json(ApiResponse::success_with_data(selection)))
}

// ============================================================================
// Catch-all proxy
// ============================================================================

/// ANY /api/proxy/{*path}
///
/// Session check, mapping-table lookup, one best-effort forward, relay.
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let session = state.require_session(&headers)?;
    let path = format!("/{}", path.trim_start_matches('/'));

    if let Some(payload) = NewsService::short_circuit(&state.config, &path) {
        return Ok(Json(payload).into_response());
    }

    // Trade listing filters are validated at the edge before the mapped
    // route ever sees them.
    let mut query = query;
    if FILTERED_TRADE_ROUTES.contains(&path.as_str()) {
        let filter = TradeFilter::from_query(&query)?;
        query.extend(filter.to_query());
    }

    let url = match proxy::resolve(state.backend.base(), &path, &query) {
        None => {
            warn!("Unmapped proxy route: {}", path);
            return Ok((StatusCode::NOT_FOUND, "Not found").into_response());
        }
        Some(resolved) => resolved?,
    };

    let outbound = OutboundMethod::from_bytes(method.as_str().as_bytes())
        .map_err(|_| AppError::Validation(format!("Unsupported method '{}'", method)))?;
    let content_type = header_str(&headers, "content-type");
    let bearer = session.map(|s| s.token);

    let proxied = state
        .backend
        .forward(outbound, &url, content_type.as_deref(), body, bearer.as_deref())
        .await?;

    Ok(relay(proxied))
}

/// POST /api/proxy/trade/import?accountNumber=..
///
/// Raw-body upload forward: the multipart CSV/HTML payload passes through
/// untouched, parsing is backend-owned.
pub async fn trade_import(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response> {
    let session = state.require_session(&headers)?;
    let account_number = required_param(&query, "accountNumber")?;

    let url = format!(
        "{}/trade/import?accountNumber={}",
        state.backend.base(),
        urlencoding::encode(&account_number)
    );
    let content_type = header_str(&headers, "content-type");
    let bearer = session.map(|s| s.token);

    let proxied = state
        .backend
        .forward(
            OutboundMethod::POST,
            &url,
            content_type.as_deref(),
            body,
            bearer.as_deref(),
        )
        .await?;

    Ok(relay(proxied))
}

// ============================================================================
// Helpers
// ============================================================================

/// Forward a typed route to its directly-specified backend endpoint.
async fn forward_json(
    state: &AppState,
    method: OutboundMethod,
    url: &str,
    body: Option<Value>,
    session: Option<SessionData>,
) -> Result<Response> {
    let bytes = match body {
        Some(value) => Bytes::from(serde_json::to_vec(&value)?),
        None => Bytes::new(),
    };
    let content_type = (!bytes.is_empty()).then_some("application/json");
    let bearer = session.map(|s| s.token);

    let proxied = state
        .backend
        .forward(method, url, content_type, bytes, bearer.as_deref())
        .await?;
    Ok(relay(proxied))
}

/// Relay a backend response verbatim: status preserved, JSON re-wrapped,
/// anything else streamed as bytes with content headers intact.
fn relay(proxied: crate::backend::ProxiedResponse) -> Response {
    let status =
        StatusCode::from_u16(proxied.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if proxied.is_json() {
        if let Ok(value) = serde_json::from_slice::<Value>(&proxied.body) {
            return (status, Json(value)).into_response();
        }
    }

    let mut response = (status, proxied.body).into_response();
    if let Some(ct) = proxied
        .content_type
        .as_deref()
        .and_then(|v| v.parse().ok())
    {
        response.headers_mut().insert(CONTENT_TYPE, ct);
    }
    if let Some(cd) = proxied
        .content_disposition
        .as_deref()
        .and_then(|v| v.parse().ok())
    {
        response.headers_mut().insert(CONTENT_DISPOSITION, cd);
    }
    response
}

fn required_param(query: &HashMap<String, String>, key: &str) -> Result<String> {
    query
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| AppError::Validation(format!("Missing required parameter '{}'", key)))
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn header_value(raw: &str) -> Result<axum::http::HeaderValue> {
    raw.parse()
        .map_err(|_| AppError::Internal("Invalid header value".to_string()))
}
