// ABOUTME: User route handlers for listing and removing users
// ABOUTME: Removal deletes the user's tokens and the user in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use super::parse_id;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{User, UserId};
use crate::server::ServerResources;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response for listing users
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    /// Every registered user, without password hashes
    pub users: Vec<User>,
}

/// Response for a removed user
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    /// The removed user
    pub user_id: UserId,
    /// Number of tokens removed with the user
    pub tokens_removed: u64,
}

/// User routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    ///
    /// The singular `/user` paths are kept for existing clients.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/users", get(Self::handle_list))
            .route("/users/:id", delete(Self::handle_delete))
            .route("/user", get(Self::handle_list))
            .route("/user/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /users
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let users = resources.database.list_users().await?;
        Ok((StatusCode::OK, Json(ListUsersResponse { users })).into_response())
    }

    /// Handle DELETE /users/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id: UserId = parse_id(&id, "user")?;
        let tokens_removed = resources.provisioning.deprovision_user(user_id).await?;

        Ok((
            StatusCode::OK,
            Json(DeleteUserResponse {
                user_id,
                tokens_removed,
            }),
        )
            .into_response())
    }
}
