// ABOUTME: Database abstraction layer for the Leaky Bucket server
// ABOUTME: The persistence contract every storage backend and test double implements

use crate::errors::AppResult;
use crate::models::{
    Company, CompanyDetails, CompanyId, ListCompaniesOptions, NewToken, NewTokenPolicy, NewUser,
    Token, TokenPolicy, TokenPolicyId, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod factory;
pub mod sqlite;

/// Core database abstraction trait
///
/// The provisioning engine and the replenishment scheduler only ever talk to
/// storage through this trait, so they run unchanged against SQLite or against
/// an in-test double that injects failures.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone + 'static {
    /// Run database migrations to set up schema
    async fn migrate(&self) -> AppResult<()>;

    // ================================
    // Companies
    // ================================

    /// Create a company
    async fn create_company(&self, name: &str) -> AppResult<Company>;

    /// Get a company by ID
    async fn get_company(&self, company_id: CompanyId) -> AppResult<Option<Company>>;

    /// Get a company with its policy and its users (each with tokens)
    async fn get_company_details(&self, company_id: CompanyId)
        -> AppResult<Option<CompanyDetails>>;

    /// List all companies with the requested relations loaded
    async fn list_companies(&self, options: ListCompaniesOptions)
        -> AppResult<Vec<CompanyDetails>>;

    // ================================
    // Token Policies
    // ================================

    /// Store a company's policy; `NotFound` for an unknown company,
    /// `Conflict` when the company already has one
    async fn create_policy(&self, policy: NewTokenPolicy) -> AppResult<TokenPolicy>;

    /// Get a policy by ID
    async fn get_policy(&self, policy_id: TokenPolicyId) -> AppResult<Option<TokenPolicy>>;

    /// Get the policy of a company
    async fn get_policy_by_company(&self, company_id: CompanyId)
        -> AppResult<Option<TokenPolicy>>;

    /// Delete a policy; `NotFound` when absent
    async fn delete_policy(&self, policy_id: TokenPolicyId) -> AppResult<()>;

    /// Stamp the time the scheduler last processed this policy
    async fn mark_policy_refilled(
        &self,
        policy_id: TokenPolicyId,
        at: DateTime<Utc>,
    ) -> AppResult<()>;

    // ================================
    // Users
    // ================================

    /// Register a user; `Conflict` on a duplicate email
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Get user by email address
    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List every user
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Delete a user and all of their tokens atomically, returning the number
    /// of tokens removed; `NotFound` when absent
    async fn delete_user(&self, user_id: UserId) -> AppResult<u64>;

    // ================================
    // Token Ledger
    // ================================

    /// Issue one token into a slot; `Conflict` when the slot is taken
    async fn create_token(&self, token: NewToken) -> AppResult<Token>;

    /// Number of tokens a user holds
    async fn count_tokens(&self, user_id: UserId) -> AppResult<u64>;

    /// Tokens a user holds, ordered by slot
    async fn list_tokens(&self, user_id: UserId) -> AppResult<Vec<Token>>;

    /// Remove every token of a user, returning how many were removed
    async fn delete_all_tokens(&self, user_id: UserId) -> AppResult<u64>;
}
