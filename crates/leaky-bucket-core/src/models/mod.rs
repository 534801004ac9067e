// ABOUTME: Core data models for companies, token policies, users, and tokens
// ABOUTME: Shared by the storage layer, the token engines, and the HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! Domain models
//!
//! A [`Company`] owns at most one [`TokenPolicy`] and any number of [`User`]s.
//! Each user holds up to `max_tokens` [`Token`]s, one per slot.

mod company;
mod ids;
mod policy;
mod token;
mod user;

pub use company::{Company, CompanyDetails, ListCompaniesOptions};
pub use ids::{CompanyId, TokenId, TokenPolicyId, UserId};
pub use policy::{NewTokenPolicy, TokenPolicy};
pub use token::{NewToken, Token};
pub use user::{NewUser, User, UserWithTokens};
