// ABOUTME: One-token-at-a-time issuance loop shared by provisioning and replenishment
// ABOUTME: Classifies each insert as issued, duplicate, or fatal and decides whether to continue

//! Token issuance
//!
//! Every token is inserted on its own into a specific slot. The storage layer's
//! `UNIQUE(user_id, company_id, slot)` index resolves races: the losing writer
//! gets a conflict, which [`IssueOutcome::Duplicate`] turns into a no-op so the
//! loop carries on with the next slot. Anything else is [`IssueOutcome::Fatal`]
//! and stops the loop.

use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{CompanyId, NewToken, Token, UserId};
use tracing::{debug, error};

/// Result of a single token insert
#[derive(Debug)]
pub enum IssueOutcome {
    /// The slot was free and the token now exists
    Issued(Token),
    /// Another writer already holds the slot
    Duplicate,
    /// A storage failure that must abort the batch
    Fatal(AppError),
}

impl From<AppResult<Token>> for IssueOutcome {
    fn from(result: AppResult<Token>) -> Self {
        match result {
            Ok(token) => Self::Issued(token),
            Err(e) if e.is_conflict() => Self::Duplicate,
            Err(e) => Self::Fatal(e),
        }
    }
}

/// Tokens issued by one batch
#[derive(Debug, Default)]
pub struct IssuedBatch {
    /// Tokens actually created, in slot order
    pub tokens: Vec<Token>,
    /// Slots skipped because they were already taken
    pub duplicates: usize,
}

impl IssuedBatch {
    /// Number of tokens created
    #[must_use]
    pub fn issued(&self) -> usize {
        self.tokens.len()
    }
}

/// Issue one token per slot for a user, in order
///
/// # Errors
///
/// Returns the first fatal storage error. Tokens issued before it stay in the
/// ledger; callers that need all-or-nothing semantics clean up themselves.
pub async fn issue_tokens<D: DatabaseProvider>(
    database: &D,
    user_id: UserId,
    company_id: CompanyId,
    slots: impl IntoIterator<Item = u32> + Send,
) -> AppResult<IssuedBatch> {
    let mut batch = IssuedBatch::default();

    for slot in slots {
        let request = NewToken {
            user_id,
            company_id,
            slot,
        };

        match IssueOutcome::from(database.create_token(request).await) {
            IssueOutcome::Issued(token) => batch.tokens.push(token),
            IssueOutcome::Duplicate => {
                debug!(%user_id, %company_id, slot, "Token slot already taken, skipping");
                batch.duplicates += 1;
            }
            IssueOutcome::Fatal(e) => {
                error!(%user_id, %company_id, slot, error = %e, "Token issuance failed");
                return Err(e);
            }
        }
    }

    Ok(batch)
}
