// ABOUTME: Server-side access point for the shared error taxonomy
// ABOUTME: Re-exports AppError, ErrorCode, and the JSON error response from the core crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! # Unified Error Handling System
//!
//! The error types live in `leaky_bucket_core` so the models and policy logic can
//! use them without pulling in the server. The core crate is built here with its
//! `http-response` and `database-errors` features, which add `IntoResponse` for
//! axum handlers and `From<sqlx::Error>` for the storage layer.

pub use leaky_bucket_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
