// ABOUTME: Database factory selecting the storage backend from the connection string
// ABOUTME: Delegates every DatabaseProvider call to the detected implementation
//! Database factory for creating database providers
//!
//! This module provides automatic database type detection and creation
//! based on connection strings.

use super::sqlite::SqliteDatabase;
use super::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Company, CompanyDetails, CompanyId, ListCompaniesOptions, NewToken, NewTokenPolicy, NewUser,
    Token, TokenPolicy, TokenPolicyId, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// Embedded SQLite file or in-memory database
    SQLite,
}

/// Database instance wrapper that delegates to the appropriate implementation
#[derive(Clone)]
pub enum Database {
    /// SQLite backend
    SQLite(SqliteDatabase),
}

impl Database {
    /// Create a new database instance based on the connection string
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database URL format is unsupported or invalid
    /// - Database connection fails
    /// - Database initialization or migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        debug!("Detecting database type from URL: {}", database_url);
        let db_type = detect_database_type(database_url)?;
        info!("Detected database type: {:?}", db_type);

        match db_type {
            DatabaseType::SQLite => {
                let db = SqliteDatabase::new(database_url).await?;
                info!("SQLite database initialized successfully");
                Ok(Self::SQLite(db))
            }
        }
    }

    /// Get a descriptive string for the current database backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::SQLite(_) => "SQLite",
        }
    }

    /// Get the database type enum
    #[must_use]
    pub const fn database_type(&self) -> DatabaseType {
        match self {
            Self::SQLite(_) => DatabaseType::SQLite,
        }
    }

    /// Raw connection pool, for diagnostics and tests
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        match self {
            Self::SQLite(db) => db.inner().pool(),
        }
    }
}

/// Automatically detect database type from connection string
///
/// # Errors
///
/// Returns a configuration error if the URL is not a `sqlite:` URL. `PostgreSQL`
/// connection strings are recognised and rejected explicitly.
pub fn detect_database_type(database_url: &str) -> AppResult<DatabaseType> {
    if database_url.starts_with("sqlite:") {
        Ok(DatabaseType::SQLite)
    } else if database_url.starts_with("postgresql://") || database_url.starts_with("postgres://") {
        Err(AppError::config(
            "PostgreSQL connection string detected, but only SQLite is supported",
        ))
    } else {
        Err(AppError::config(format!(
            "Unsupported database URL format: {database_url}. \
             Supported format: sqlite:path/to/db.sqlite or sqlite::memory:"
        )))
    }
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn migrate(&self) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.migrate().await,
        }
    }

    async fn create_company(&self, name: &str) -> AppResult<Company> {
        match self {
            Self::SQLite(db) => db.create_company(name).await,
        }
    }

    async fn get_company(&self, company_id: CompanyId) -> AppResult<Option<Company>> {
        match self {
            Self::SQLite(db) => db.get_company(company_id).await,
        }
    }

    async fn get_company_details(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Option<CompanyDetails>> {
        match self {
            Self::SQLite(db) => db.get_company_details(company_id).await,
        }
    }

    async fn list_companies(
        &self,
        options: ListCompaniesOptions,
    ) -> AppResult<Vec<CompanyDetails>> {
        match self {
            Self::SQLite(db) => db.list_companies(options).await,
        }
    }

    async fn create_policy(&self, policy: NewTokenPolicy) -> AppResult<TokenPolicy> {
        match self {
            Self::SQLite(db) => db.create_policy(policy).await,
        }
    }

    async fn get_policy(&self, policy_id: TokenPolicyId) -> AppResult<Option<TokenPolicy>> {
        match self {
            Self::SQLite(db) => db.get_policy(policy_id).await,
        }
    }

    async fn get_policy_by_company(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Option<TokenPolicy>> {
        match self {
            Self::SQLite(db) => db.get_policy_by_company(company_id).await,
        }
    }

    async fn delete_policy(&self, policy_id: TokenPolicyId) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.delete_policy(policy_id).await,
        }
    }

    async fn mark_policy_refilled(
        &self,
        policy_id: TokenPolicyId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.mark_policy_refilled(policy_id, at).await,
        }
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        match self {
            Self::SQLite(db) => db.create_user(user).await,
        }
    }

    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        match self {
            Self::SQLite(db) => db.get_user(user_id).await,
        }
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        match self {
            Self::SQLite(db) => db.get_user_by_email(email).await,
        }
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        match self {
            Self::SQLite(db) => db.list_users().await,
        }
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<u64> {
        match self {
            Self::SQLite(db) => db.delete_user(user_id).await,
        }
    }

    async fn create_token(&self, token: NewToken) -> AppResult<Token> {
        match self {
            Self::SQLite(db) => db.create_token(token).await,
        }
    }

    async fn count_tokens(&self, user_id: UserId) -> AppResult<u64> {
        match self {
            Self::SQLite(db) => db.count_tokens(user_id).await,
        }
    }

    async fn list_tokens(&self, user_id: UserId) -> AppResult<Vec<Token>> {
        match self {
            Self::SQLite(db) => db.list_tokens(user_id).await,
        }
    }

    async fn delete_all_tokens(&self, user_id: UserId) -> AppResult<u64> {
        match self {
            Self::SQLite(db) => db.delete_all_tokens(user_id).await,
        }
    }
}
