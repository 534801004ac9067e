// ABOUTME: Company database operations and eager loading of company relations
// ABOUTME: Builds CompanyDetails views with policies, users, and their tokens

use super::{timestamp_column, uuid_column, Database};
use crate::errors::AppResult;
use crate::models::{
    Company, CompanyDetails, CompanyId, ListCompaniesOptions, TokenPolicy, UserWithTokens,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

impl Database {
    /// Create the companies table
    pub(super) async fn migrate_companies(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS companies (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a company
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_company(&self, name: &str) -> AppResult<Company> {
        let company = Company::new(name.to_owned());

        sqlx::query("INSERT INTO companies (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(company.id.to_string())
            .bind(&company.name)
            .bind(company.created_at)
            .execute(&self.pool)
            .await?;

        Ok(company)
    }

    /// Get a company by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_company(&self, company_id: CompanyId) -> AppResult<Option<Company>> {
        let row = sqlx::query("SELECT id, name, created_at FROM companies WHERE id = $1")
            .bind(company_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_company).transpose()
    }

    /// Get a company with its policy and users (each with tokens)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the underlying queries fail
    pub async fn get_company_details(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Option<CompanyDetails>> {
        let Some(company) = self.get_company(company_id).await? else {
            return Ok(None);
        };

        let policy = self.get_policy_by_company(company_id).await?;
        let users = self.list_users_with_tokens(Some(company_id)).await?;

        Ok(Some(CompanyDetails {
            company,
            policy,
            users: Some(users),
        }))
    }

    /// List all companies, loading the requested relations in bulk
    ///
    /// # Errors
    ///
    /// Returns an error if any of the underlying queries fail
    pub async fn list_companies(
        &self,
        options: ListCompaniesOptions,
    ) -> AppResult<Vec<CompanyDetails>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM companies ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        let companies = rows
            .iter()
            .map(Self::row_to_company)
            .collect::<AppResult<Vec<_>>>()?;

        let mut policies: HashMap<CompanyId, TokenPolicy> = if options.include_policy {
            self.list_policies()
                .await?
                .into_iter()
                .map(|policy| (policy.company_id, policy))
                .collect()
        } else {
            HashMap::new()
        };

        let mut users_by_company: HashMap<CompanyId, Vec<UserWithTokens>> = HashMap::new();
        if options.include_users {
            for user in self.list_users_with_tokens(None).await? {
                users_by_company
                    .entry(user.user.company_id)
                    .or_default()
                    .push(user);
            }
        }

        Ok(companies
            .into_iter()
            .map(|company| {
                let policy = policies.remove(&company.id);
                let users = options
                    .include_users
                    .then(|| users_by_company.remove(&company.id).unwrap_or_default());
                CompanyDetails {
                    company,
                    policy,
                    users,
                }
            })
            .collect())
    }

    fn row_to_company(row: &SqliteRow) -> AppResult<Company> {
        Ok(Company {
            id: CompanyId::from_uuid(uuid_column(row, "id")?),
            name: row.try_get("name")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}
