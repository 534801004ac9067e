// ABOUTME: Company (tenant) model and the eager-loaded company view
// ABOUTME: CompanyDetails bundles a company with its policy and users for scans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use super::{CompanyId, TokenPolicy, UserWithTokens};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A company that users sign up under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Unique company identifier
    pub id: CompanyId,
    /// Display name
    pub name: String,
    /// When the company was created
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Create a new company with a fresh identifier
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            id: CompanyId::new(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Which relations to load alongside each company
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCompaniesOptions {
    /// Load users (each with their current tokens)
    pub include_users: bool,
    /// Load the company's token policy
    pub include_policy: bool,
}

impl ListCompaniesOptions {
    /// Load every relation; what the replenishment scan needs
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            include_users: true,
            include_policy: true,
        }
    }
}

/// A company with its optionally loaded relations
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetails {
    /// The company itself
    #[serde(flatten)]
    pub company: Company,
    /// Token policy, when loaded and present
    pub policy: Option<TokenPolicy>,
    /// Users with their tokens; `None` when users were not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserWithTokens>>,
}

impl CompanyDetails {
    /// Users of the company, empty when they were not loaded
    #[must_use]
    pub fn users(&self) -> &[UserWithTokens] {
        self.users.as_deref().unwrap_or_default()
    }

    /// Whether at least one user was loaded for this company
    #[must_use]
    pub fn has_users(&self) -> bool {
        !self.users().is_empty()
    }
}
