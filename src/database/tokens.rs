// ABOUTME: Token ledger database operations
// ABOUTME: Slot-keyed token inserts, counts, listings, and bulk removal per user

use super::{timestamp_column, u32_column, uuid_column, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{CompanyId, NewToken, Token, TokenId, UserId};
use sqlx::sqlite::SqliteRow;

const TOKEN_COLUMNS: &str = "id, user_id, company_id, slot, issued_at";

impl Database {
    /// Create the tokens table
    pub(super) async fn migrate_tokens(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tokens (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                slot INTEGER NOT NULL CHECK (slot >= 0),
                issued_at TEXT NOT NULL,
                UNIQUE (user_id, company_id, slot)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tokens_company ON tokens(company_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Issue a token into a slot
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the user already holds a token in this
    /// slot for this company, any other error for storage failures
    pub async fn create_token(&self, new_token: NewToken) -> AppResult<Token> {
        let token = new_token.into_token();

        sqlx::query(
            r"
            INSERT INTO tokens (id, user_id, company_id, slot, issued_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(token.company_id.to_string())
        .bind(i64::from(token.slot))
        .bind(token.issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if leaky_bucket_core::errors::database::is_unique_violation(&e) {
                AppError::conflict(format!(
                    "User {} already holds slot {} for company {}",
                    token.user_id, token.slot, token.company_id
                ))
            } else {
                AppError::from(e)
            }
        })?;

        Ok(token)
    }

    /// Number of tokens a user currently holds
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_tokens(&self, user_id: UserId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tokens WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Tokens a user currently holds, by slot
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt
    pub async fn list_tokens(&self, user_id: UserId) -> AppResult<Vec<Token>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE user_id = $1 ORDER BY slot"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_token).collect()
    }

    /// Remove every token of a user, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_all_tokens(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub(super) async fn list_company_tokens(&self, company_id: CompanyId) -> AppResult<Vec<Token>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE company_id = $1 ORDER BY user_id, slot"
        ))
        .bind(company_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_token).collect()
    }

    pub(super) async fn list_all_tokens(&self) -> AppResult<Vec<Token>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens ORDER BY user_id, slot"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_token).collect()
    }

    fn row_to_token(row: &SqliteRow) -> AppResult<Token> {
        Ok(Token {
            id: TokenId::from_uuid(uuid_column(row, "id")?),
            user_id: UserId::from_uuid(uuid_column(row, "user_id")?),
            company_id: CompanyId::from_uuid(uuid_column(row, "company_id")?),
            slot: u32_column(row, "slot")?,
            issued_at: timestamp_column(row, "issued_at")?,
        })
    }
}
