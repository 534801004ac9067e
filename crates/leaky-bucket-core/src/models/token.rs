// ABOUTME: Token model, one opaque unit of entitlement held by a user
// ABOUTME: Tokens are keyed by (user, company, slot) so balances can exceed one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use super::{CompanyId, TokenId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A token held by a user
///
/// Carries no value of its own: a user's balance is the number of tokens they
/// hold. `slot` is the position in `[0, max_tokens)` the token occupies, and
/// `(user_id, company_id, slot)` is unique in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Unique token identifier
    pub id: TokenId,
    /// Owning user
    pub user_id: UserId,
    /// Company the token is scoped to
    pub company_id: CompanyId,
    /// Occupied slot below the policy cap
    pub slot: u32,
    /// When the token was issued
    pub issued_at: DateTime<Utc>,
}

/// Request to issue one token into a specific slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewToken {
    /// Owning user
    pub user_id: UserId,
    /// Company the token is scoped to
    pub company_id: CompanyId,
    /// Slot to claim
    pub slot: u32,
}

impl NewToken {
    /// Build the stored token row with a fresh identifier
    #[must_use]
    pub fn into_token(self) -> Token {
        Token {
            id: TokenId::new(),
            user_id: self.user_id,
            company_id: self.company_id,
            slot: self.slot,
            issued_at: Utc::now(),
        }
    }
}
