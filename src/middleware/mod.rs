// ABOUTME: HTTP middleware configuration for the axum router
// ABOUTME: Cross-origin settings; request tracing layers are assembled in server.rs

/// CORS configuration
pub mod cors;

pub use cors::setup_cors;
