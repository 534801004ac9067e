// ABOUTME: Effective token policy resolution with defaults and title derivation
// ABOUTME: Pure functions shared by policy creation, provisioning, and replenishment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! # Policy Resolution
//!
//! A company may have no policy, and a policy request may omit fields. Every
//! consumer goes through [`EffectivePolicy`] so the defaults (10 tokens, one hour
//! cooldown) live in exactly one place.

use crate::constants::policy::{
    COOLDOWN_TITLES, DEFAULT_MAX_TOKENS, DEFAULT_REFILL_COOLDOWN_MS, MAX_TOKENS_LIMIT,
};
use crate::errors::{AppError, AppResult};
use crate::models::{CompanyId, NewTokenPolicy, TokenPolicy};
use std::collections::BTreeSet;

/// Token cap and cooldown after defaults have been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectivePolicy {
    /// Maximum tokens per user
    pub max_tokens: u32,
    /// Refill cooldown in milliseconds
    pub refill_cooldown_ms: u64,
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            refill_cooldown_ms: DEFAULT_REFILL_COOLDOWN_MS,
        }
    }
}

impl EffectivePolicy {
    /// Apply defaults to individually optional fields
    #[must_use]
    pub fn from_parts(max_tokens: Option<u32>, refill_cooldown_ms: Option<u64>) -> Self {
        Self {
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            refill_cooldown_ms: refill_cooldown_ms.unwrap_or(DEFAULT_REFILL_COOLDOWN_MS),
        }
    }

    /// Resolve the policy in force for a company that may have none
    #[must_use]
    pub fn for_company(policy: Option<&TokenPolicy>) -> Self {
        policy.map_or_else(Self::default, |policy| Self {
            max_tokens: policy.max_tokens,
            refill_cooldown_ms: policy.refill_cooldown_ms,
        })
    }

    /// Tokens missing to reach the cap; zero or negative means nothing to issue
    #[must_use]
    pub fn deficit(&self, current_tokens: usize) -> i64 {
        let held = i64::try_from(current_tokens).unwrap_or(i64::MAX);
        i64::from(self.max_tokens) - held
    }

    /// The lowest free slots below the cap, as many as the deficit requires
    ///
    /// Slots at or above the cap (left over from a larger earlier policy) count
    /// toward the balance but are never handed out again.
    #[must_use]
    pub fn slots_to_fill(&self, occupied: impl IntoIterator<Item = u32>) -> Vec<u32> {
        let occupied: BTreeSet<u32> = occupied.into_iter().collect();
        let Ok(wanted) = usize::try_from(self.deficit(occupied.len())) else {
            return Vec::new();
        };

        (0..self.max_tokens)
            .filter(|slot| !occupied.contains(slot))
            .take(wanted)
            .collect()
    }

    /// All slots of a fresh balance
    pub fn initial_slots(&self) -> impl Iterator<Item = u32> {
        0..self.max_tokens
    }
}

/// Title a policy gets when it is created without one
#[must_use]
pub fn default_title(refill_cooldown_ms: u64) -> String {
    COOLDOWN_TITLES
        .iter()
        .find(|(cooldown, _)| *cooldown == refill_cooldown_ms)
        .map_or_else(
            || format!("Once every {refill_cooldown_ms}ms token policy"),
            |(_, title)| (*title).to_owned(),
        )
}

/// Validate a policy request and fill in every default
///
/// # Errors
///
/// Returns `ValueOutOfRange` when `max_tokens` or `refill_cooldown_ms` is zero,
/// or when `max_tokens` exceeds [`MAX_TOKENS_LIMIT`].
pub fn resolve_new_policy(
    company_id: CompanyId,
    title: Option<&str>,
    max_tokens: Option<u32>,
    refill_cooldown_ms: Option<u64>,
) -> AppResult<NewTokenPolicy> {
    if max_tokens == Some(0) {
        return Err(AppError::out_of_range(
            "max_tokens",
            "max_tokens must be a positive integer",
        ));
    }
    if let Some(max) = max_tokens.filter(|max| *max > MAX_TOKENS_LIMIT) {
        return Err(AppError::out_of_range(
            "max_tokens",
            format!("max_tokens {max} exceeds the limit of {MAX_TOKENS_LIMIT}"),
        ));
    }
    if refill_cooldown_ms == Some(0) {
        return Err(AppError::out_of_range(
            "refill_cooldown_ms",
            "refill_cooldown_ms must be a positive integer",
        ));
    }

    let effective = EffectivePolicy::from_parts(max_tokens, refill_cooldown_ms);
    let title = title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map_or_else(
            || default_title(effective.refill_cooldown_ms),
            str::to_owned,
        );

    Ok(NewTokenPolicy {
        company_id,
        title,
        max_tokens: effective.max_tokens,
        refill_cooldown_ms: effective.refill_cooldown_ms,
    })
}
