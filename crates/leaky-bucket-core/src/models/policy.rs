// ABOUTME: Token policy model owned one-to-one by a company
// ABOUTME: Caps each user's token balance and records the refill cadence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use super::{CompanyId, TokenPolicyId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A company's token policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPolicy {
    /// Unique policy identifier
    pub id: TokenPolicyId,
    /// Owning company
    pub company_id: CompanyId,
    /// Human-readable title
    pub title: String,
    /// Maximum number of tokens a user of the company may hold
    pub max_tokens: u32,
    /// Nominal delay between refills, in milliseconds
    pub refill_cooldown_ms: u64,
    /// When the policy was created
    pub created_at: DateTime<Utc>,
    /// When the replenishment scheduler last processed this company
    pub last_refilled_at: Option<DateTime<Utc>>,
}

/// Fully resolved values for a policy about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTokenPolicy {
    /// Owning company
    pub company_id: CompanyId,
    /// Title, already derived from the cooldown when the caller gave none
    pub title: String,
    /// Token cap
    pub max_tokens: u32,
    /// Refill cooldown in milliseconds
    pub refill_cooldown_ms: u64,
}

impl NewTokenPolicy {
    /// Build the stored policy row with a fresh identifier
    #[must_use]
    pub fn into_policy(self) -> TokenPolicy {
        TokenPolicy {
            id: TokenPolicyId::new(),
            company_id: self.company_id,
            title: self.title,
            max_tokens: self.max_tokens,
            refill_cooldown_ms: self.refill_cooldown_ms,
            created_at: Utc::now(),
            last_refilled_at: None,
        }
    }
}
