//! Sepal Gateway
//!
//! Session and API-proxy service for the sepal trading journal. The gateway
//! owns the encrypted `sepal_session` cookie, translates the dashboard's
//! internal routes to the trading backend's endpoints, and forwards each
//! request once with a session-derived bearer token. All business data and
//! invariants live in the backend; this service is the authenticated edge.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod services;
pub mod session;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for the gateway process.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sepal_gateway=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
