// ABOUTME: DatabaseProvider test double that wraps a real database and injects token-write faults
// ABOUTME: Simulates storage failures, slow writes, users deleted mid-write, and slot races

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leaky_bucket_server::{
    database_plugins::{factory::Database, DatabaseProvider},
    errors::{AppError, AppResult},
    models::{
        Company, CompanyDetails, CompanyId, ListCompaniesOptions, NewToken, NewTokenPolicy,
        NewUser, Token, TokenPolicy, TokenPolicyId, User, UserId,
    },
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Wraps a real database; token inserts can fail or lose a race on demand
#[derive(Clone)]
pub struct FaultyDatabase {
    inner: Database,
    token_writes: Arc<AtomicUsize>,
    fail_at_write: Arc<Mutex<Option<usize>>>,
    contested_slots: Arc<Mutex<HashSet<u32>>>,
    write_delay: Arc<Mutex<Option<Duration>>>,
    vanishing_users: Arc<Mutex<HashSet<UserId>>>,
}

impl FaultyDatabase {
    pub fn new(inner: Database) -> Self {
        Self {
            inner,
            token_writes: Arc::new(AtomicUsize::new(0)),
            fail_at_write: Arc::new(Mutex::new(None)),
            contested_slots: Arc::new(Mutex::new(HashSet::new())),
            write_delay: Arc::new(Mutex::new(None)),
            vanishing_users: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Make the token write with this zero-based index fail with a storage error
    pub fn fail_token_write(&self, index: usize) {
        self.token_writes.store(0, Ordering::SeqCst);
        *self.fail_at_write.lock().unwrap() = Some(index);
    }

    /// Stop injecting write failures
    pub fn clear_write_failure(&self) {
        *self.fail_at_write.lock().unwrap() = None;
    }

    /// Have another writer take `slot` just before our insert lands
    pub fn contest_slot(&self, slot: u32) {
        self.contested_slots.lock().unwrap().insert(slot);
    }

    /// Sleep before every token write
    pub fn slow_token_writes(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = Some(delay);
    }

    /// Delete `user_id` right before the next token write for that user
    pub fn remove_user_before_token_write(&self, user_id: UserId) {
        self.vanishing_users.lock().unwrap().insert(user_id);
    }

    pub fn inner(&self) -> &Database {
        &self.inner
    }
}

#[async_trait]
impl DatabaseProvider for FaultyDatabase {
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
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let vanishing = self.vanishing_users.lock().unwrap().remove(&token.user_id);
        if vanishing {
            self.inner.delete_user(token.user_id).await?;
        }

        let index = self.token_writes.fetch_add(1, Ordering::SeqCst);
        let fail_at = *self.fail_at_write.lock().unwrap();
        if fail_at == Some(index) {
            return Err(AppError::database("injected failure: disk I/O error"));
        }

        let contested = self.contested_slots.lock().unwrap().remove(&token.slot);
        if contested {
            self.inner.create_token(token).await?;
        }

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
