// ABOUTME: Company route handlers for listing and creating companies
// ABOUTME: Listing always includes each company's policy and optionally its users with tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use super::{json_body, require_non_empty};
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{CompanyDetails, ListCompaniesOptions};
use crate::server::ServerResources;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for listing companies
#[derive(Debug, Default, Deserialize)]
pub struct ListCompaniesQuery {
    /// Include each company's users and their tokens
    #[serde(default, alias = "showUsers")]
    pub show_users: bool,
}

/// Company creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompanyRequest {
    /// Display name
    #[serde(alias = "companyName")]
    pub name: String,
}

/// Response for listing companies
#[derive(Debug, Serialize)]
pub struct ListCompaniesResponse {
    /// Companies with their relations
    pub companies: Vec<CompanyDetails>,
}

/// Company routes
pub struct CompanyRoutes;

impl CompanyRoutes {
    /// Create all company routes
    ///
    /// `/company` is an alias of `/companies`.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/companies",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/company", get(Self::handle_list).post(Self::handle_create))
            .with_state(resources)
    }

    /// Handle GET /companies
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListCompaniesQuery>,
    ) -> Result<Response, AppError> {
        let companies = resources
            .database
            .list_companies(ListCompaniesOptions {
                include_users: query.show_users,
                include_policy: true,
            })
            .await?;

        Ok((StatusCode::OK, Json(ListCompaniesResponse { companies })).into_response())
    }

    /// Handle POST /companies
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreateCompanyRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;
        require_non_empty(&request.name, "name")?;

        let company = resources
            .database
            .create_company(request.name.trim())
            .await?;

        Ok((StatusCode::CREATED, Json(company)).into_response())
    }
}
