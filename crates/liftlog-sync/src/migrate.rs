//! The one-time local→cloud migration orchestrator.
//!
//! Sequencing per store activation: flag check → legacy-file check → open
//! legacy store → plan workouts → favorites → settings → apply in one
//! commit → set flag. The durable flag flips only after the commit, so any
//! failure leaves it unset and the next launch retries; the plan is a pure
//! id-set difference, so partial progress is never duplicated.

use std::{
  path::PathBuf,
  sync::atomic::{AtomicBool, Ordering},
};

use liftlog_core::{
  flags::{FlagStore, MIGRATED_LOCAL_TO_CLOUD},
  reconcile::{self, MigrationPlan},
  store::LogStore,
};
use liftlog_store_sqlite::SqliteStore;
use tracing::{error, info};

use crate::provider::{ActiveStore, StoreKind};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Why a run decided there was nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// The active store is local-only; there is no cloud side to migrate to.
  NotCloudBacked,
  /// Another run already started in this process.
  AlreadyStarted,
  /// The durable flag says a previous launch completed the migration.
  AlreadyMigrated,
  /// No legacy store file exists on disk; the flag is set so future
  /// launches skip even the file check.
  NoLegacyStore,
}

/// What one orchestrator run did. Failures are reported here, not raised —
/// the app continues on its active store regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
  Skipped(SkipReason),
  /// Logged and left for the next launch to retry; the flag stays false.
  Failed,
  Completed {
    workouts:  usize,
    favorites: usize,
    settings:  usize,
  },
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Runs the legacy-store migration at most once per process, and — via the
/// durable flag — at most once ever.
pub struct Migrator {
  legacy_path: PathBuf,
  started:     AtomicBool,
}

impl Migrator {
  pub fn new(legacy_path: impl Into<PathBuf>) -> Self {
    Self { legacy_path: legacy_path.into(), started: AtomicBool::new(false) }
  }

  /// Migrate the legacy local store into `active` if needed.
  ///
  /// Never returns an error: failures are logged and reported as
  /// [`MigrationOutcome::Failed`] with the flag left false.
  pub async fn run(
    &self,
    active: &ActiveStore,
    flags: &dyn FlagStore,
  ) -> MigrationOutcome {
    if active.kind != StoreKind::Cloud {
      return MigrationOutcome::Skipped(SkipReason::NotCloudBacked);
    }
    if flags.get(MIGRATED_LOCAL_TO_CLOUD) {
      return MigrationOutcome::Skipped(SkipReason::AlreadyMigrated);
    }
    // In-process re-entrancy guard: one attempt per launch, even if invoked
    // twice before the flag is durably set.
    if self.started.swap(true, Ordering::SeqCst) {
      return MigrationOutcome::Skipped(SkipReason::AlreadyStarted);
    }

    if !self.legacy_path.exists() {
      // Nothing to migrate — but remember that, so future launches skip
      // straight past the file check.
      flags.set(MIGRATED_LOCAL_TO_CLOUD, true);
      return MigrationOutcome::Skipped(SkipReason::NoLegacyStore);
    }

    match self.migrate(&active.store).await {
      Ok(plan) => {
        flags.set(MIGRATED_LOCAL_TO_CLOUD, true);
        let outcome = MigrationOutcome::Completed {
          workouts:  plan.workouts.len(),
          favorites: plan.favorites.len(),
          settings:  usize::from(plan.settings.is_some()),
        };
        info!(?outcome, "legacy store migrated");
        outcome
      }
      Err(e) => {
        error!(%e, "legacy store migration failed; will retry next launch");
        MigrationOutcome::Failed
      }
    }
  }

  /// The fallible middle: open the legacy store, plan, apply. Returns the
  /// applied plan so the caller can report counts.
  async fn migrate(
    &self,
    destination: &SqliteStore,
  ) -> Result<MigrationPlan, liftlog_store_sqlite::Error> {
    let legacy = SqliteStore::open(&self.legacy_path).await?;

    let plan = reconcile::plan(
      &legacy.list_workouts().await?,
      &destination.list_workouts().await?,
      &legacy.list_favorites().await?,
      &destination.list_favorites().await?,
      &legacy.list_settings().await?,
      &destination.list_settings().await?,
    );

    destination.apply_plan(plan.clone()).await?;
    Ok(plan)
  }
}
