//! HTTP surface
//!
//! Route handlers, the response envelope, the backend-health gate, and the
//! server lifecycle. The handlers do no business logic of their own: they
//! enforce the session, delegate to the services and the backend client,
//! and relay what comes back.

pub mod handlers;
pub mod health_gate;
pub mod server;
pub mod types;

pub use server::GatewayServer;
