// ABOUTME: Server-side access point for the domain models
// ABOUTME: Re-exports companies, policies, users, tokens, and their identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! # Data Models
//!
//! Defined in `leaky_bucket_core::models` and re-exported so server modules can
//! write `crate::models::User`.

pub use leaky_bucket_core::models::*;
