// ABOUTME: Token lifecycle engines: issuance, signup provisioning, and scheduled replenishment
// ABOUTME: Generic over DatabaseProvider so they run against SQLite or a test double
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! # Token Lifecycle
//!
//! A token is `absent`, then `held`, then `absent` again only when its user is
//! deleted. Nothing here spends tokens.

/// Per-slot issuance loop shared by both engines
pub mod issuance;
/// Signup-time allotment and user removal
pub mod provisioning;
/// Periodic top-up to the policy cap
pub mod replenishment;

pub use issuance::{issue_tokens, IssueOutcome, IssuedBatch};
pub use provisioning::{ProvisionedUser, ProvisioningEngine};
pub use replenishment::{RefillHandle, RefillOutcome, RefillReport, RefillScheduler, SkipReason};
