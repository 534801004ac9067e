// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, server resources, and company/policy/user fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `leaky_bucket_server`

use anyhow::Result;
use leaky_bucket_server::{
    config::{AuthConfig, RefillConfig, ServerConfig},
    database_plugins::{factory::Database, DatabaseProvider},
    models::{Company, NewTokenPolicy, NewUser, TokenPolicy, User},
    server::{build_router, ServerResources},
};
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh, migrated in-memory database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// Configuration with a fixed secret, a cheap bcrypt cost, and the scheduler off
pub fn test_config() -> ServerConfig {
    ServerConfig {
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".into(),
            jwt_secret_generated: false,
            jwt_expiry_hours: 24,
            bcrypt_cost: 4,
        },
        refill: RefillConfig {
            enabled: false,
            ..RefillConfig::default()
        },
        ..ServerConfig::default()
    }
}

/// Server resources over a fresh in-memory database
pub async fn create_test_server_resources() -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    Ok(Arc::new(ServerResources::new(
        database,
        Arc::new(test_config()),
    )))
}

/// Full router plus the resources behind it
pub async fn create_test_app() -> Result<(axum::Router, Arc<ServerResources>)> {
    let resources = create_test_server_resources().await?;
    Ok((build_router(&resources), resources))
}

/// Create a company with a policy capping users at `max_tokens`
pub async fn create_company_with_policy<D: DatabaseProvider>(
    database: &D,
    name: &str,
    max_tokens: u32,
) -> Result<(Company, TokenPolicy)> {
    let company = database.create_company(name).await?;
    let policy = database
        .create_policy(NewTokenPolicy {
            company_id: company.id,
            title: "Hourly token policy".into(),
            max_tokens,
            refill_cooldown_ms: 3_600_000,
        })
        .await?;
    Ok((company, policy))
}

/// Insert a user directly, without issuing any tokens
pub async fn create_bare_user<D: DatabaseProvider>(
    database: &D,
    company: &Company,
    email: &str,
) -> Result<User> {
    Ok(database
        .create_user(NewUser {
            company_id: company.id,
            name: "Test User".into(),
            email: email.into(),
            password_hash: "$2b$04$not-a-real-hash".into(),
        })
        .await?)
}

/// A signup payload for the given company
pub fn new_user(company: &Company, email: &str) -> NewUser {
    NewUser {
        company_id: company.id,
        name: "Test User".into(),
        email: email.into(),
        password_hash: "$2b$04$not-a-real-hash".into(),
    }
}
