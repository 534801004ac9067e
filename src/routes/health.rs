// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness without dependencies, readiness with a database round trip
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! Health check routes for service monitoring

use crate::constants::service_names;
use crate::errors::AppError;
use crate::server::ServerResources;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "service": service_names::LEAKY_BUCKET_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    async fn handle_ready(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Json<Value>, AppError> {
        sqlx::query("SELECT 1")
            .execute(resources.database.pool())
            .await?;

        Ok(Json(json!({
            "status": "ready",
            "database": resources.database.backend_info(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        })))
    }
}
