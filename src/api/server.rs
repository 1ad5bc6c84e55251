//! Gateway HTTP server
//!
//! Router assembly and lifecycle: bind, serve with graceful shutdown, stop.

use crate::api::handlers;
use crate::api::health_gate::{health_gate_middleware, HealthGate};
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Body-size ceiling for forwarded uploads. A season of CSV trade exports
/// runs to a few MiB; axum's 2 MiB default would reject them before the
/// handler runs.
const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Gateway server manager
pub struct GatewayServer {
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

/// Build the full gateway router.
pub fn router(state: Arc<AppState>) -> Router {
    let gate = HealthGate::new(state.clone());

    // Allow all origins: the gateway fronts local dashboards in development
    // and sits behind the site's own origin in production.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & maintenance
        .route("/health", get(handlers::health_check))
        .route("/maintenance", get(handlers::maintenance))
        // Session lifecycle
        .route("/api/security/login", post(handlers::login))
        .route("/api/security/logout", post(handlers::logout))
        .route("/api/security/me", get(handlers::me))
        .route("/api/security/portfolio", put(handlers::select_portfolio))
        // Typed account routes
        .route("/api/account/create", post(handlers::create_account))
        .route("/api/account/update", put(handlers::update_account))
        .route("/api/account/delete", delete(handlers::delete_account))
        .route("/api/account/active", get(handlers::active_account))
        // Trade import upload (static route wins over the wildcard); both
        // body-forwarding routes take uploads past axum's default limit.
        .route(
            "/api/proxy/trade/import",
            post(handlers::trade_import).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Catch-all proxy
        .route(
            "/api/proxy/*path",
            any(handlers::proxy).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(state)
        .layer(middleware::from_fn_with_state(gate, health_gate_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

impl GatewayServer {
    /// Create a new server
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
            local_addr: None,
        }
    }

    /// Bind the listener and start serving in a background task.
    ///
    /// Returns the bound address; with `SERVER_PORT=0` the OS picks an
    /// ephemeral port, which is how the tests run.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let addr: SocketAddr = self
            .state
            .config
            .bind_addr()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address: {}", e)))?;

        let app = router(self.state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::Internal(format!("No local address: {}", e)))?;
        self.local_addr = Some(local_addr);

        info!("Starting sepal gateway on {}", local_addr);
        info!("Proxying to backend at {}", self.state.backend.base());

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Gateway shutting down");
            });

            if let Err(e) = server.await {
                error!("Gateway server error: {}", e);
            }
        });

        Ok(local_addr)
    }

    /// Address the server is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Gateway stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for GatewayServer {
    fn drop(&mut self) {
        self.stop();
    }
}
