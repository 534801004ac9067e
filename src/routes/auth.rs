// ABOUTME: User authentication route handlers for signup and login
// ABOUTME: Signup provisions the initial token allotment; login issues a JWT
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! Authentication routes
//!
//! Handlers validate the request shape, hash or verify the password, and hand
//! the rest to the provisioning engine or the auth manager.

use super::{is_valid_email, json_body, require_non_empty};
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::models::{CompanyId, NewUser};
use crate::server::ServerResources;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// User signup request
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// Company to join
    #[serde(alias = "companyId")]
    pub company_id: CompanyId,
}

/// User login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// User login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// HS256 session token
    pub token: String,
    /// RFC 3339 expiry of the token
    pub expires_at: String,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/signup", post(Self::handle_signup))
            .route("/login", post(Self::handle_login))
            .with_state(resources)
    }

    /// Handle POST /signup - register a user and issue their tokens
    async fn handle_signup(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<SignupRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;

        require_non_empty(&request.name, "name")?;
        require_non_empty(&request.password, "password")?;
        let email = request.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::invalid_input("Invalid email format"));
        }

        let password_hash = resources
            .auth_manager
            .hash_password(&request.password)
            .await?;

        let provisioned = resources
            .provisioning
            .provision_user(NewUser {
                company_id: request.company_id,
                name: request.name.trim().to_owned(),
                email,
                password_hash,
            })
            .await?;

        info!(
            user_id = %provisioned.user.id,
            company_id = %provisioned.user.company_id,
            tokens = provisioned.tokens.len(),
            "User signed up"
        );

        Ok((StatusCode::CREATED, Json(provisioned)).into_response())
    }

    /// Handle POST /login - verify credentials and issue a JWT
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<LoginRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;
        require_non_empty(&request.email, "email")?;
        require_non_empty(&request.password, "password")?;

        let email = request.email.trim().to_lowercase();
        let Some(user) = resources.database.get_user_by_email(&email).await? else {
            AppLogger::log_auth_event(&email, "login", false, Some("unknown email"));
            return Err(AppError::auth_invalid("Invalid email or password"));
        };

        let is_valid = resources
            .auth_manager
            .verify_password(&request.password, &user.password_hash)
            .await?;
        if !is_valid {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, Some("bad password"));
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let issued = resources.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(&user.id.to_string(), "login", true, None);

        Ok((
            StatusCode::OK,
            Json(LoginResponse {
                token: issued.token,
                expires_at: issued.expires_at.to_rfc3339(),
            }),
        )
            .into_response())
    }
}
