// ABOUTME: User model belonging to exactly one company
// ABOUTME: Password hashes stay opaque and are never serialized into responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use super::{CompanyId, Token, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,
    /// Company the user signed up under
    pub company_id: CompanyId,
    /// Display name
    pub name: String,
    /// Login email, unique across the server
    pub email: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// When the user signed up
    pub created_at: DateTime<Utc>,
}

/// Values for a user about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Company to sign up under
    pub company_id: CompanyId,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
}

impl NewUser {
    /// Build the stored user row with a fresh identifier
    #[must_use]
    pub fn into_user(self) -> User {
        User {
            id: UserId::new(),
            company_id: self.company_id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: Utc::now(),
        }
    }
}

/// A user together with the tokens currently held
#[derive(Debug, Clone, Serialize)]
pub struct UserWithTokens {
    /// The user
    #[serde(flatten)]
    pub user: User,
    /// Tokens currently held
    pub tokens: Vec<Token>,
}

impl UserWithTokens {
    /// Current balance
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Slots currently occupied
    pub fn occupied_slots(&self) -> impl Iterator<Item = u32> + '_ {
        self.tokens.iter().map(|token| token.slot)
    }
}
