//! # Homedash Server
//!
//! HTTP surface of the dashboard: axum routes over the core services,
//! plus the application context that wires configuration, database,
//! provider adapters, and connectivity together.

pub mod context;
pub mod cookies;
pub mod routes;

pub use context::AppContext;
