// ABOUTME: System-wide constants and configuration defaults for the Leaky Bucket server
// ABOUTME: Service names, default ports and paths, JWT lifetime, and replenishment cadence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! # Constants Module
//!
//! Defaults used when the corresponding environment variable is unset. Policy
//! defaults (10 tokens, one hour cooldown) live in `leaky_bucket_core` and are
//! re-exported here as [`policy`].

pub use leaky_bucket_core::constants::policy;

/// Service identity
pub mod service_names {
    /// Name used in structured logs and the health endpoint
    pub const LEAKY_BUCKET_SERVER: &str = "leaky-bucket-server";
}

/// Network defaults
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 3000;
    /// Default bind address
    pub const DEFAULT_HOST: &str = "127.0.0.1";
}

/// Storage defaults
pub mod database {
    /// Default SQLite database location
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/leaky_bucket.db";
}

/// Authentication defaults
pub mod auth {
    /// Default JWT lifetime in hours
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
    /// Length of the per-process JWT secret generated when none is configured
    pub const GENERATED_SECRET_LEN: usize = 64;
}

/// Replenishment scheduler defaults
pub mod refill {
    /// Seconds between scheduled refill runs
    pub const DEFAULT_INTERVAL_SECS: u64 = 3600;
}

/// HTTP layer limits
pub mod http {
    /// Request timeout applied to every route
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Header carrying the request correlation id
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
}
