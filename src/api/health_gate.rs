//! Backend-health gate middleware
//!
//! While the backend health endpoint is unreachable, page-style requests are
//! redirected to `/maintenance` and API requests answer 503. Probes are
//! cached for a short TTL so an outage does not turn every inbound request
//! into a backend probe; recovery is automatic once a probe succeeds.

use crate::api::types::{ApiResponse, Empty};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// How long one probe result stays authoritative.
const PROBE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
struct Probe {
    healthy: bool,
    at: Instant,
}

/// Shared gate state: the app state for probing plus the cached result.
pub struct HealthGate {
    state: Arc<AppState>,
    ttl: Duration,
    last: RwLock<Option<Probe>>,
}

impl HealthGate {
    pub fn new(state: Arc<AppState>) -> Arc<Self> {
        Self::with_ttl(state, PROBE_TTL)
    }

    pub fn with_ttl(state: Arc<AppState>, ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            state,
            ttl,
            last: RwLock::new(None),
        })
    }

    /// Cached backend health, probing when the cache is stale.
    pub async fn backend_healthy(&self) -> bool {
        if let Some(probe) = *self.last.read() {
            if probe.at.elapsed() < self.ttl {
                return probe.healthy;
            }
        }

        let healthy = self.state.backend.health().await;
        *self.last.write() = Some(Probe {
            healthy,
            at: Instant::now(),
        });
        healthy
    }
}

/// Paths that must stay reachable during an outage.
fn is_exempt(path: &str) -> bool {
    path == "/health" || path == "/maintenance"
}

/// The middleware itself, applied to the whole router.
pub async fn health_gate_middleware(
    State(gate): State<Arc<HealthGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_exempt(&path) {
        return next.run(request).await;
    }

    if gate.backend_healthy().await {
        return next.run(request).await;
    }

    warn!("Backend unreachable, gating {} {}", request.method(), path);

    if path.starts_with("/api") {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::<Empty>::error(
                "The trading journal backend is unavailable",
            )),
        )
            .into_response();
    }

    if request.method() == Method::GET {
        return Redirect::temporary("/maintenance").into_response();
    }

    (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response()
}
