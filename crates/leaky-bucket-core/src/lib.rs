// ABOUTME: Core types and constants for the Leaky Bucket token issuance server
// ABOUTME: Foundation crate with error handling, domain models, and policy resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

#![deny(unsafe_code)]

//! # Leaky Bucket Core
//!
//! Foundation crate providing shared types for the Leaky Bucket token issuance
//! server. It has no knowledge of HTTP routing or of the storage engine, which
//! keeps the policy rules testable on their own.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Policy defaults and cooldown title table
//! - **models**: Companies, token policies, users, and tokens
//! - **policy**: Effective policy resolution and title derivation

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Policy defaults and other domain constants
pub mod constants;

/// Core data models (Company, `TokenPolicy`, User, Token)
pub mod models;

/// Effective policy resolution
pub mod policy;
