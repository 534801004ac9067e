// ABOUTME: Main library entry point for the Leaky Bucket token issuance server
// ABOUTME: Multi-tenant companies, per-company token policies, signup provisioning, and periodic refill
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

#![deny(unsafe_code)]

//! # Leaky Bucket Server
//!
//! A multi-tenant token issuance service. Companies register users; each
//! company's token policy caps how many tokens a user may hold. Signup issues
//! the full allotment at once, and a background scheduler tops every user back
//! up to the cap on a fixed interval.
//!
//! ## Architecture
//!
//! - **Database**: `SQLite` storage behind the [`database_plugins::DatabaseProvider`] trait
//! - **Tokens**: slot-keyed issuance, signup provisioning, and the refill scheduler
//! - **Routes**: axum handlers for companies, policies, users, signup, and login
//! - **Auth**: bcrypt password hashing and HS256 session tokens
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use leaky_bucket_server::config::ServerConfig;
//! use leaky_bucket_server::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     Server::from_config(config).await?.run().await?;
//!     Ok(())
//! }
//! ```

/// Session tokens and password hashing
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants and configuration defaults
pub mod constants;

/// `SQLite` storage for companies, policies, users, and tokens
pub mod database;

/// Database abstraction layer with backend selection
pub mod database_plugins;

/// Unified error handling re-exported from the core crate
pub mod errors;

/// Production logging and structured events
pub mod logging;

/// HTTP middleware configuration
pub mod middleware;

/// Domain models re-exported from the core crate
pub mod models;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Token issuance, provisioning, and replenishment
pub mod tokens;
