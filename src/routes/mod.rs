// ABOUTME: Route module organization for the Leaky Bucket HTTP endpoints
// ABOUTME: Groups routes by domain and holds the shared request-parsing helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! Route module for the Leaky Bucket server
//!
//! Each domain module exposes a `XRoutes::routes(resources)` constructor and thin
//! handlers that delegate to the token engines and the database provider.

/// Signup and login routes
pub mod auth;
/// Company management routes
pub mod companies;
/// Health check routes
pub mod health;
/// Token policy management routes
pub mod policies;
/// User listing and removal routes
pub mod users;

pub use auth::{AuthRoutes, LoginRequest, LoginResponse, SignupRequest};
pub use companies::{CompanyRoutes, CreateCompanyRequest, ListCompaniesQuery};
pub use health::HealthRoutes;
pub use policies::{CreatePolicyRequest, PolicyRoutes};
pub use users::{DeleteUserResponse, UserRoutes};

use crate::errors::{AppError, AppResult};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use std::str::FromStr;

/// Unwrap a JSON body, turning extractor rejections into validation errors
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

/// Parse a path identifier, rejecting malformed values with a validation error
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> AppResult<T> {
    raw.parse()
        .map_err(|_| AppError::invalid_input(format!("Invalid {what} id: {raw}")))
}

/// Reject blank required fields
pub(crate) fn require_non_empty(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Simple email validation
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() <= 5 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some(at_pos) = email.find('@') else {
        return false;
    };
    if at_pos == 0 || at_pos == email.len() - 1 {
        return false;
    }
    let domain_part = &email[at_pos + 1..];
    !domain_part.contains('@')
        && domain_part.contains('.')
        && !domain_part.starts_with('.')
        && !domain_part.ends_with('.')
}
