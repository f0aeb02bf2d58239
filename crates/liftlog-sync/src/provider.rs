//! Opening the active store, with an explicit fallback policy.
//!
//! Two stores share one schema: a cloud-synced database and a local-only
//! one. Which gets attempted, and in what order, is a pure function of the
//! account availability — so the policy is unit-testable without touching
//! disk. A cloud open failure degrades to local; no store at all is fatal.

use std::path::{Path, PathBuf};

use liftlog_store_sqlite::SqliteStore;
use tracing::{info, warn};

use crate::{Error, Result, account::Availability};

// ─── Store identity ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
  Local,
  Cloud,
}

/// Locations of the two databases.
#[derive(Debug, Clone)]
pub struct StorePaths {
  pub local: PathBuf,
  pub cloud: PathBuf,
}

impl StorePaths {
  /// Conventional layout under one data directory.
  pub fn under(data_dir: impl AsRef<Path>) -> Self {
    let dir = data_dir.as_ref();
    Self {
      local: dir.join("liftlog.db"),
      cloud: dir.join("liftlog-cloud.db"),
    }
  }

  pub fn of(&self, kind: StoreKind) -> &Path {
    match kind {
      StoreKind::Local => &self.local,
      StoreKind::Cloud => &self.cloud,
    }
  }
}

/// The store the app will run against, and which one it turned out to be.
#[derive(Debug, Clone)]
pub struct ActiveStore {
  pub store: SqliteStore,
  pub kind:  StoreKind,
}

// ─── Fallback policy ─────────────────────────────────────────────────────────

/// Which stores to attempt, in order. Pure: the whole fallback policy lives
/// here. Anything short of a definitive "available" skips the cloud store
/// entirely (and with it, migration).
pub fn attempt_order(availability: Availability) -> &'static [StoreKind] {
  if availability.allows_cloud() {
    &[StoreKind::Cloud, StoreKind::Local]
  } else {
    &[StoreKind::Local]
  }
}

/// Open the active store per [`attempt_order`].
///
/// The first successful open wins. A failed cloud open is logged and
/// degrades to the local store; if no candidate opens at all, the error is
/// [`Error::NoUsableStore`] — fatal, the app cannot run storeless.
pub async fn open_active_store(
  paths: &StorePaths,
  availability: Availability,
) -> Result<ActiveStore> {
  for &kind in attempt_order(availability) {
    match SqliteStore::open(paths.of(kind)).await {
      Ok(store) => {
        info!(?kind, path = %paths.of(kind).display(), "opened store");
        return Ok(ActiveStore { store, kind });
      }
      Err(e) => {
        warn!(?kind, path = %paths.of(kind).display(), %e, "store open failed");
      }
    }
  }
  Err(Error::NoUsableStore)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cloud_is_attempted_only_when_available() {
    assert_eq!(
      attempt_order(Availability::Available),
      &[StoreKind::Cloud, StoreKind::Local]
    );
    for availability in [
      Availability::NoAccount,
      Availability::Restricted,
      Availability::Unknown,
    ] {
      assert_eq!(attempt_order(availability), &[StoreKind::Local]);
    }
  }

  #[tokio::test]
  async fn falls_back_to_local_when_cloud_open_fails() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::under(dir.path());
    // A directory at the cloud path makes that open fail.
    std::fs::create_dir(&paths.cloud).unwrap();

    let active = open_active_store(&paths, Availability::Available)
      .await
      .unwrap();
    assert_eq!(active.kind, StoreKind::Local);
  }

  #[tokio::test]
  async fn cloud_wins_when_it_opens() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::under(dir.path());

    let active = open_active_store(&paths, Availability::Available)
      .await
      .unwrap();
    assert_eq!(active.kind, StoreKind::Cloud);
  }

  #[tokio::test]
  async fn no_openable_store_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::under(dir.path());
    std::fs::create_dir(&paths.local).unwrap();

    let err = open_active_store(&paths, Availability::NoAccount)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NoUsableStore));
  }
}
