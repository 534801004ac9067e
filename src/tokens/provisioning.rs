// ABOUTME: Signup-time token provisioning and user removal
// ABOUTME: Validates company and policy, creates the user, and issues the initial allotment

//! # Provisioning Engine
//!
//! Signup runs three checks before writing anything: the company exists, it has
//! a token policy, and the email is free. Only then is the user created and
//! given one token per slot up to the policy cap.
//!
//! A fatal storage error while issuing tokens aborts the signup. The new user is
//! deleted again (taking any tokens already issued with it) and the original
//! error is returned, so a failed signup never leaves a half-provisioned account.
//!
//! The writes run on their own task. If the caller goes away mid-signup (client
//! disconnect, request timeout) the task still finishes the allotment or rolls
//! it back.

use super::issuance::issue_tokens;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{NewUser, Token, User, UserId};
use leaky_bucket_core::policy::EffectivePolicy;
use serde::Serialize;
use tracing::{info, warn};

/// A newly registered user and the tokens they received
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedUser {
    /// The created user
    pub user: User,
    /// Tokens actually issued; fewer than the cap only when slots were already taken
    pub tokens: Vec<Token>,
}

/// Issues initial tokens at signup and removes them with the user
#[derive(Clone)]
pub struct ProvisioningEngine<D> {
    database: D,
}

impl<D: DatabaseProvider> ProvisioningEngine<D> {
    /// Create an engine over a storage backend
    #[must_use]
    pub const fn new(database: D) -> Self {
        Self { database }
    }

    /// Register a user and issue their initial allotment
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the company does not exist
    /// - `PolicyMissing` if the company has no token policy
    /// - `ResourceAlreadyExists` if the email is already registered
    /// - any fatal storage error raised while creating the user or its tokens
    pub async fn provision_user(&self, new_user: NewUser) -> AppResult<ProvisionedUser> {
        let company_id = new_user.company_id;

        if self.database.get_company(company_id).await?.is_none() {
            return Err(AppError::not_found(format!("Company {company_id}")));
        }

        let Some(policy) = self.database.get_policy_by_company(company_id).await? else {
            return Err(AppError::policy_missing(company_id));
        };

        if self
            .database
            .get_user_by_email(&new_user.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Email {} is already registered",
                new_user.email
            )));
        }

        let effective = EffectivePolicy::for_company(Some(&policy));
        let database = self.database.clone();

        // Runs to completion or rollback even if this future is dropped
        tokio::spawn(async move {
            Self::create_and_allot(&database, new_user, effective.initial_slots()).await
        })
        .await
        .map_err(|e| AppError::internal(format!("Signup task failed: {e}")))?
    }

    async fn create_and_allot(
        database: &D,
        new_user: NewUser,
        slots: impl IntoIterator<Item = u32> + Send,
    ) -> AppResult<ProvisionedUser> {
        let company_id = new_user.company_id;
        let user = database.create_user(new_user).await?;

        let batch = match issue_tokens(database, user.id, company_id, slots).await {
            Ok(batch) => batch,
            Err(e) => {
                Self::roll_back_signup(database, user.id).await;
                return Err(e);
            }
        };

        AppLogger::log_tokens_issued(
            &user.id.to_string(),
            &company_id.to_string(),
            "signup",
            batch.issued(),
            batch.duplicates,
        );

        Ok(ProvisionedUser {
            user,
            tokens: batch.tokens,
        })
    }

    /// Delete a user together with all of their tokens
    ///
    /// Returns the number of tokens removed.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist; nothing is deleted
    pub async fn deprovision_user(&self, user_id: UserId) -> AppResult<u64> {
        let tokens_removed = self.database.delete_user(user_id).await?;
        AppLogger::log_user_removed(&user_id.to_string(), tokens_removed);
        Ok(tokens_removed)
    }

    async fn roll_back_signup(database: &D, user_id: UserId) {
        match database.delete_user(user_id).await {
            Ok(tokens_removed) => {
                info!(%user_id, tokens_removed, "Rolled back signup after token issuance failure");
            }
            Err(e) => {
                warn!(%user_id, error = %e, "Failed to roll back signup; user left without full allotment");
            }
        }
    }
}
