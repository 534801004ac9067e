// ABOUTME: Periodic replenishment that tops every user up to their company's token cap
// ABOUTME: Runs one scan per tick in a background task with explicit shutdown

//! # Replenishment Scheduler
//!
//! Each run loads every company with its policy and users, resolves the
//! effective policy, and issues the missing tokens for each user into the lowest
//! free slots below the cap. A user already at or above the cap is skipped on
//! its own; the scan always continues with the next user.
//!
//! Runs never overlap: the background task awaits a run before it waits for the
//! next tick, and ticks missed during a slow run are dropped.

use super::issuance::issue_tokens;
use crate::config::RefillConfig;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::models::{ListCompaniesOptions, TokenPolicy};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use leaky_bucket_core::policy::EffectivePolicy;
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Why a run did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No company exists
    NoCompanies,
    /// Companies exist but none has a user
    NoUsers,
}

/// Counters for one completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefillReport {
    /// Companies loaded by the scan
    pub companies_scanned: usize,
    /// Users examined (excluding companies skipped by cooldown)
    pub users_scanned: usize,
    /// Users already at or above their cap
    pub users_at_cap: usize,
    /// Tokens created by this run
    pub tokens_issued: usize,
    /// Slots found already taken by a concurrent writer
    pub duplicates: usize,
    /// Companies skipped because their policy cooldown had not elapsed
    pub companies_on_cooldown: usize,
    /// Users deleted while the run was topping them up
    pub users_removed: usize,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

/// Result of one replenishment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefillOutcome {
    /// Nothing to scan; the store was not touched
    Skipped {
        /// Why nothing was scanned
        reason: SkipReason,
    },
    /// The scan ran to completion
    Completed(RefillReport),
}

/// Tops every user up to their company's cap
#[derive(Clone)]
pub struct RefillScheduler<D> {
    database: D,
    config: RefillConfig,
}

impl<D: DatabaseProvider> RefillScheduler<D> {
    /// Create a scheduler over a storage backend
    #[must_use]
    pub const fn new(database: D, config: RefillConfig) -> Self {
        Self { database, config }
    }

    /// Run one replenishment pass as of `now`
    ///
    /// # Errors
    ///
    /// Returns the first fatal storage error; tokens issued before it are kept
    /// and the next run picks up where this one stopped. A failed insert for a
    /// user deleted mid-run is not fatal; that user is skipped.
    pub async fn run_once(&self, now: DateTime<Utc>) -> AppResult<RefillOutcome> {
        let started = Instant::now();
        let companies = self
            .database
            .list_companies(ListCompaniesOptions::everything())
            .await?;

        if companies.is_empty() {
            debug!("Refill skipped: no companies");
            return Ok(RefillOutcome::Skipped {
                reason: SkipReason::NoCompanies,
            });
        }
        if !companies.iter().any(|company| company.has_users()) {
            debug!("Refill skipped: no users");
            return Ok(RefillOutcome::Skipped {
                reason: SkipReason::NoUsers,
            });
        }

        let mut report = RefillReport {
            companies_scanned: companies.len(),
            ..RefillReport::default()
        };

        for details in &companies {
            let company_id = details.company.id;

            if let Some(policy) = details.policy.as_ref() {
                if self.config.honor_policy_cooldown && on_cooldown(policy, now) {
                    debug!(%company_id, "Refill skipped: policy cooldown has not elapsed");
                    report.companies_on_cooldown += 1;
                    continue;
                }
            }

            let effective = EffectivePolicy::for_company(details.policy.as_ref());

            for holder in details.users() {
                report.users_scanned += 1;

                if effective.deficit(holder.token_count()) <= 0 {
                    report.users_at_cap += 1;
                    continue;
                }

                let slots = effective.slots_to_fill(holder.occupied_slots());
                let user_id = holder.user.id;
                let batch = match issue_tokens(&self.database, user_id, company_id, slots).await {
                    Ok(batch) => batch,
                    Err(e) => {
                        if self.database.get_user(user_id).await?.is_some() {
                            return Err(e);
                        }
                        warn!(%user_id, %company_id, error = %e, "User removed during refill, skipping");
                        report.users_removed += 1;
                        continue;
                    }
                };

                report.tokens_issued += batch.issued();
                report.duplicates += batch.duplicates;
                AppLogger::log_tokens_issued(
                    &user_id.to_string(),
                    &company_id.to_string(),
                    "refill",
                    batch.issued(),
                    batch.duplicates,
                );
            }

            if let Some(policy) = details.policy.as_ref() {
                self.database.mark_policy_refilled(policy.id, now).await?;
            }
        }

        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_refill_run(&report);

        Ok(RefillOutcome::Completed(report))
    }

    /// Start the periodic task; the first run happens one interval from now
    #[must_use]
    pub fn spawn(self) -> RefillHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let period = self.config.interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval_secs = period.as_secs(), "Token replenishment scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once(Utc::now()).await {
                            error!(error = %e, "Token replenishment run failed; retrying next tick");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Token replenishment scheduler received shutdown signal");
                        break;
                    }
                }
            }

            info!("Token replenishment scheduler stopped");
        });

        RefillHandle { shutdown_tx, task }
    }
}

/// Handle to a running scheduler task
pub struct RefillHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RefillHandle {
    /// Signal the task to stop and wait for any in-flight run to finish
    pub async fn shutdown(self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            debug!(error = ?e, "Scheduler shutdown signal send failed (task already gone)");
        }
        if let Err(e) = self.task.await {
            error!(error = %e, "Token replenishment task panicked");
        }
    }
}

/// Whether a policy was refilled less than its cooldown ago
fn on_cooldown(policy: &TokenPolicy, now: DateTime<Utc>) -> bool {
    let Some(last) = policy.last_refilled_at else {
        return false;
    };
    let cooldown = i64::try_from(policy.refill_cooldown_ms)
        .map_or(ChronoDuration::MAX, ChronoDuration::milliseconds);
    now.signed_duration_since(last) < cooldown
}
