//! Durable one-shot migration flags.
//!
//! A flag is a process-wide boolean with "once true, never re-run" semantics:
//! it is set only after the guarded operation's effects are durably
//! committed, and it is a guard, never a source of truth for data.
//!
//! The store is an injected dependency rather than an ambient singleton so
//! the guard logic is testable with [`MemoryFlags`].

use std::{collections::HashSet, sync::Mutex};

/// Flag guarding the one-time local→cloud store migration.
pub const MIGRATED_LOCAL_TO_CLOUD: &str = "didMigrateLocalStoreToCloud";
/// Flag guarding the one-time legacy favorites-blob migration.
pub const MIGRATED_FAVORITES: &str = "didMigrateFavoriteExerciseIDsToSwiftData";
/// Flag guarding the one-time legacy settings-string migration.
pub const MIGRATED_SETTINGS: &str = "didMigrateUserSettingsToSwiftData";

/// Durable string-keyed boolean flags surviving process restarts.
///
/// Persistence is best-effort: implementations log and swallow write
/// failures rather than surface them.
pub trait FlagStore: Send + Sync {
  /// Current value of `key`; `false` when unset.
  fn get(&self, key: &str) -> bool;

  /// Durably set `key` to `value`.
  fn set(&self, key: &str, value: bool);
}

/// In-memory [`FlagStore`] for tests. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryFlags {
  set: Mutex<HashSet<String>>,
}

impl MemoryFlags {
  pub fn new() -> Self { Self::default() }
}

impl FlagStore for MemoryFlags {
  fn get(&self, key: &str) -> bool {
    self.set.lock().expect("flag lock").contains(key)
  }

  fn set(&self, key: &str, value: bool) {
    let mut set = self.set.lock().expect("flag lock");
    if value {
      set.insert(key.to_owned());
    } else {
      set.remove(key);
    }
  }
}
