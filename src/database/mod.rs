// ABOUTME: SQLite storage for companies, token policies, users, and the token ledger
// ABOUTME: Owns the connection pool and runs schema migrations at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! # Database Management
//!
//! The [`Database`] type owns the sqlx pool. Each entity keeps its queries in its
//! own submodule (`companies`, `policies`, `users`, `tokens`), all implemented as
//! inherent methods on [`Database`] and exposed to the rest of the server through
//! [`crate::database_plugins::DatabaseProvider`].
//!
//! The `tokens` table carries `UNIQUE(user_id, company_id, slot)`. That index is
//! the only thing standing between two concurrent writers and an over-provisioned
//! user, so migrations must never drop it.

mod companies;
mod policies;
mod tokens;
mod users;

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Database manager for the token ledger and its owners
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// `sqlite::memory:` is served by a single pinned connection so every query
    /// sees the same in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL cannot be parsed as a SQLite connection string
    /// - The parent directory of the database file cannot be created
    /// - Connecting or migrating fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL {database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = is_in_memory(database_url);
        if !in_memory {
            ensure_parent_dir(options.get_filename())?;
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        debug!(in_memory, "SQLite pool connected");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any `CREATE TABLE` or `CREATE INDEX` statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        // Order matters: every table references the ones before it.
        self.migrate_companies().await?;
        self.migrate_policies().await?;
        self.migrate_users().await?;
        self.migrate_tokens().await?;

        info!("Database migrations complete");
        Ok(())
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!(
                    "Cannot create database directory {}: {e}",
                    parent.display()
                ))
            })
        }
        _ => Ok(()),
    }
}

/// Read a UUID stored as TEXT
pub(crate) fn uuid_column(row: &SqliteRow, column: &str) -> AppResult<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw)
        .map_err(|e| AppError::database(format!("Corrupt {column} value {raw:?}: {e}")))
}

/// Read a non-negative integer column stored as INTEGER
pub(crate) fn u32_column(row: &SqliteRow, column: &str) -> AppResult<u32> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw).map_err(|_| AppError::database(format!("{column} out of range: {raw}")))
}

/// Read a timestamp column
pub(crate) fn timestamp_column(row: &SqliteRow, column: &str) -> AppResult<DateTime<Utc>> {
    Ok(row.try_get(column)?)
}
