// ABOUTME: SQLite implementation of the DatabaseProvider trait
// ABOUTME: Thin delegation layer over the sqlx-backed Database manager

//! SQLite database implementation
//!
//! This module wraps [`crate::database::Database`] to implement the
//! [`DatabaseProvider`] trait.

use super::DatabaseProvider;
use crate::errors::AppResult;
use crate::models::{
    Company, CompanyDetails, CompanyId, ListCompaniesOptions, NewToken, NewTokenPolicy, NewUser,
    Token, TokenPolicy, TokenPolicyId, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// SQLite database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    /// The underlying database instance
    inner: crate::database::Database,
}

impl SqliteDatabase {
    /// Connect to a SQLite database and migrate it
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let inner = crate::database::Database::new(database_url).await?;
        Ok(Self { inner })
    }

    /// Get a reference to the inner database for raw pool access
    #[must_use]
    pub const fn inner(&self) -> &crate::database::Database {
        &self.inner
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn migrate(&self) -> AppResult<()> {
        self.inner.migrate().await
    }

    async fn create_company(&self, name: &str) -> AppResult<Company> {
        self.inner.create_company(name).await
    }

    async fn get_company(&self, company_id: CompanyId) -> AppResult<Option<Company>> {
        self.inner.get_company(company_id).await
    }

    async fn get_company_details(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Option<CompanyDetails>> {
        self.inner.get_company_details(company_id).await
    }

    async fn list_companies(
        &self,
        options: ListCompaniesOptions,
    ) -> AppResult<Vec<CompanyDetails>> {
        self.inner.list_companies(options).await
    }

    async fn create_policy(&self, policy: NewTokenPolicy) -> AppResult<TokenPolicy> {
        self.inner.create_policy(policy).await
    }

    async fn get_policy(&self, policy_id: TokenPolicyId) -> AppResult<Option<TokenPolicy>> {
        self.inner.get_policy(policy_id).await
    }

    async fn get_policy_by_company(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Option<TokenPolicy>> {
        self.inner.get_policy_by_company(company_id).await
    }

    async fn delete_policy(&self, policy_id: TokenPolicyId) -> AppResult<()> {
        self.inner.delete_policy(policy_id).await
    }

    async fn mark_policy_refilled(
        &self,
        policy_id: TokenPolicyId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.inner.mark_policy_refilled(policy_id, at).await
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        self.inner.create_user(user).await
    }

    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        self.inner.get_user(user_id).await
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.inner.get_user_by_email(email).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<u64> {
        self.inner.delete_user(user_id).await
    }

    async fn create_token(&self, token: NewToken) -> AppResult<Token> {
        self.inner.create_token(token).await
    }

    async fn count_tokens(&self, user_id: UserId) -> AppResult<u64> {
        self.inner.count_tokens(user_id).await
    }

    async fn list_tokens(&self, user_id: UserId) -> AppResult<Vec<Token>> {
        self.inner.list_tokens(user_id).await
    }

    async fn delete_all_tokens(&self, user_id: UserId) -> AppResult<u64> {
        self.inner.delete_all_tokens(user_id).await
    }
}
