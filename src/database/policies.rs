// ABOUTME: Token policy database operations
// ABOUTME: Enforces one policy per company and records refill timestamps

use super::{timestamp_column, u32_column, uuid_column, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{CompanyId, NewTokenPolicy, TokenPolicy, TokenPolicyId};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const POLICY_COLUMNS: &str =
    "id, company_id, title, max_tokens, refill_cooldown_ms, created_at, last_refilled_at";

impl Database {
    /// Create the token policies table
    pub(super) async fn migrate_policies(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS token_policies (
                id TEXT PRIMARY KEY,
                company_id TEXT NOT NULL UNIQUE REFERENCES companies(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                max_tokens INTEGER NOT NULL CHECK (max_tokens > 0),
                refill_cooldown_ms INTEGER NOT NULL CHECK (refill_cooldown_ms > 0),
                created_at TEXT NOT NULL,
                last_refilled_at TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a policy for a company
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the company does not exist and
    /// `ResourceAlreadyExists` if the company already has a policy
    pub async fn create_policy(&self, new_policy: NewTokenPolicy) -> AppResult<TokenPolicy> {
        if self.get_company(new_policy.company_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Company {}",
                new_policy.company_id
            )));
        }

        let policy = new_policy.into_policy();
        let cooldown = i64::try_from(policy.refill_cooldown_ms).map_err(|_| {
            AppError::out_of_range("refill_cooldown_ms", "refill_cooldown_ms is too large")
        })?;

        sqlx::query(
            r"
            INSERT INTO token_policies
                (id, company_id, title, max_tokens, refill_cooldown_ms, created_at, last_refilled_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL)
            ",
        )
        .bind(policy.id.to_string())
        .bind(policy.company_id.to_string())
        .bind(&policy.title)
        .bind(i64::from(policy.max_tokens))
        .bind(cooldown)
        .bind(policy.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if leaky_bucket_core::errors::database::is_unique_violation(&e) {
                AppError::conflict(format!(
                    "Company {} already has a token policy",
                    policy.company_id
                ))
            } else {
                AppError::from(e)
            }
        })?;

        Ok(policy)
    }

    /// Get a policy by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_policy(&self, policy_id: TokenPolicyId) -> AppResult<Option<TokenPolicy>> {
        let row = sqlx::query(&format!(
            "SELECT {POLICY_COLUMNS} FROM token_policies WHERE id = $1"
        ))
        .bind(policy_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_policy).transpose()
    }

    /// Get the policy of a company, if it has one
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_policy_by_company(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Option<TokenPolicy>> {
        let row = sqlx::query(&format!(
            "SELECT {POLICY_COLUMNS} FROM token_policies WHERE company_id = $1"
        ))
        .bind(company_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_policy).transpose()
    }

    /// List every stored policy
    pub(super) async fn list_policies(&self) -> AppResult<Vec<TokenPolicy>> {
        let rows = sqlx::query(&format!("SELECT {POLICY_COLUMNS} FROM token_policies"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_policy).collect()
    }

    /// Delete a policy
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no policy has this ID
    pub async fn delete_policy(&self, policy_id: TokenPolicyId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM token_policies WHERE id = $1")
            .bind(policy_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Token policy {policy_id}")));
        }
        Ok(())
    }

    /// Record that the replenishment scheduler processed this policy's company
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_policy_refilled(
        &self,
        policy_id: TokenPolicyId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE token_policies SET last_refilled_at = $2 WHERE id = $1")
            .bind(policy_id.to_string())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn row_to_policy(row: &SqliteRow) -> AppResult<TokenPolicy> {
        let cooldown: i64 = row.try_get("refill_cooldown_ms")?;

        Ok(TokenPolicy {
            id: TokenPolicyId::from_uuid(uuid_column(row, "id")?),
            company_id: CompanyId::from_uuid(uuid_column(row, "company_id")?),
            title: row.try_get("title")?,
            max_tokens: u32_column(row, "max_tokens")?,
            refill_cooldown_ms: u64::try_from(cooldown).map_err(|_| {
                AppError::database(format!("refill_cooldown_ms out of range: {cooldown}"))
            })?,
            created_at: timestamp_column(row, "created_at")?,
            last_refilled_at: row.try_get("last_refilled_at")?,
        })
    }
}
