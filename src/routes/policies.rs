// ABOUTME: Token policy route handlers for creating and deleting company policies
// ABOUTME: Applies policy defaults and derives the title before storing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use super::{json_body, parse_id};
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{CompanyId, TokenPolicyId};
use crate::server::ServerResources;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use leaky_bucket_core::policy::resolve_new_policy;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Token policy creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePolicyRequest {
    /// Company the policy governs
    #[serde(alias = "companyId")]
    pub company_id: CompanyId,
    /// Optional title; derived from the cooldown when absent
    pub title: Option<String>,
    /// Optional token cap; 10 when absent
    #[serde(alias = "maxTokens")]
    pub max_tokens: Option<u32>,
    /// Optional refill cooldown in milliseconds; one hour when absent
    #[serde(alias = "newTokenCooldown")]
    pub refill_cooldown_ms: Option<u64>,
}

/// Token policy routes
pub struct PolicyRoutes;

impl PolicyRoutes {
    /// Create all token policy routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/token-policies", post(Self::handle_create))
            .route("/token-policies/:id", delete(Self::handle_delete))
            .route("/token-policy", post(Self::handle_create))
            .route("/token-policy/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle POST /token-policies
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreatePolicyRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;

        let new_policy = resolve_new_policy(
            request.company_id,
            request.title.as_deref(),
            request.max_tokens,
            request.refill_cooldown_ms,
        )?;
        let policy = resources.database.create_policy(new_policy).await?;

        info!(
            policy_id = %policy.id,
            company_id = %policy.company_id,
            max_tokens = policy.max_tokens,
            refill_cooldown_ms = policy.refill_cooldown_ms,
            "Token policy created"
        );

        Ok((StatusCode::CREATED, Json(policy)).into_response())
    }

    /// Handle DELETE /token-policies/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let policy_id: TokenPolicyId = parse_id(&id, "token policy")?;
        resources.database.delete_policy(policy_id).await?;

        Ok((StatusCode::OK, Json(json!({ "success": true }))).into_response())
    }
}
