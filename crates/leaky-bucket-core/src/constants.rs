// ABOUTME: Domain constants for token policies and cooldown labelling
// ABOUTME: Holds the policy defaults shared by storage, provisioning, and replenishment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! Constants module

/// Token policy defaults
pub mod policy {
    /// Token cap applied when a company has no policy or the policy omits it
    pub const DEFAULT_MAX_TOKENS: u32 = 10;

    /// Refill cooldown applied when a company has no policy or the policy omits it (1 hour)
    pub const DEFAULT_REFILL_COOLDOWN_MS: u64 = 3_600_000;

    /// One day in milliseconds
    pub const DAY_MS: u64 = 86_400_000;

    /// One hour in milliseconds
    pub const HOUR_MS: u64 = 3_600_000;

    /// One minute in milliseconds
    pub const MINUTE_MS: u64 = 60_000;

    /// Known cooldowns and the title a policy gets when none is supplied
    pub const COOLDOWN_TITLES: [(u64, &str); 3] = [
        (DAY_MS, "Daily token policy"),
        (HOUR_MS, "Hourly token policy"),
        (MINUTE_MS, "Every minute token policy"),
    ];

    /// Upper bound accepted for `max_tokens` on policy creation
    pub const MAX_TOKENS_LIMIT: u32 = 10_000;
}
