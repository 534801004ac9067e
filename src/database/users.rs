// ABOUTME: User management database operations
// ABOUTME: Handles registration, lookup by email, and transactional user removal

use super::{timestamp_column, uuid_column, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{CompanyId, NewUser, Token, User, UserId, UserWithTokens};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

const USER_COLUMNS: &str = "id, company_id, name, email, password_hash, created_at";

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_company ON users(company_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Register a user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is already registered
    pub async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let user = new_user.into_user();

        sqlx::query(
            r"
            INSERT INTO users (id, company_id, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(user.id.to_string())
        .bind(user.company_id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if leaky_bucket_core::errors::database::is_unique_violation(&e) {
                AppError::conflict(format!("Email {} is already registered", user.email))
            } else {
                AppError::from(e)
            }
        })?;

        Ok(user)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Get a user by email address
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// List every user, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_user).collect()
    }

    /// Delete a user's tokens and then the user in one transaction
    ///
    /// Returns the number of tokens removed.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist; nothing is deleted
    pub async fn delete_user(&self, user_id: UserId) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let tokens = sqlx::query("DELETE FROM tokens WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        if user.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::not_found(format!("User {user_id}")));
        }

        tx.commit().await?;
        Ok(tokens.rows_affected())
    }

    /// Users with their current tokens, optionally restricted to one company
    pub(super) async fn list_users_with_tokens(
        &self,
        company_id: Option<CompanyId>,
    ) -> AppResult<Vec<UserWithTokens>> {
        let (users, tokens) = if let Some(company_id) = company_id {
            let users = sqlx::query(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE company_id = $1 ORDER BY created_at, id"
            ))
            .bind(company_id.to_string())
            .fetch_all(&self.pool)
            .await?;
            (users, self.list_company_tokens(company_id).await?)
        } else {
            let users = sqlx::query(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
            ))
            .fetch_all(&self.pool)
            .await?;
            (users, self.list_all_tokens().await?)
        };

        let mut tokens_by_user: HashMap<UserId, Vec<Token>> = HashMap::new();
        for token in tokens {
            tokens_by_user.entry(token.user_id).or_default().push(token);
        }

        users
            .iter()
            .map(|row| {
                let user = Self::row_to_user(row)?;
                let tokens = tokens_by_user.remove(&user.id).unwrap_or_default();
                Ok(UserWithTokens { user, tokens })
            })
            .collect()
    }

    fn row_to_user(row: &SqliteRow) -> AppResult<User> {
        Ok(User {
            id: UserId::from_uuid(uuid_column(row, "id")?),
            company_id: CompanyId::from_uuid(uuid_column(row, "company_id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}
