//! Runtime-facing stores for LiftLog.
//!
//! Thin write-through caches in front of the active store: the UI layer
//! reads from memory and mutates optimistically; writes land in SQLite
//! immediately, and a failed write triggers a reload so the cache resyncs
//! with actual store state. Each cache performs its own flag-gated one-shot
//! migration from the legacy defaults-file format on first bind.
//!
//! Both caches are confined to a single task; they hold no locks.

pub mod favorites;
pub mod settings;

use liftlog_core::flags::FlagStore;
use liftlog_sync::defaults::{
  FileDefaults, LEGACY_FAVORITES_KEY, LEGACY_WEIGHT_UNIT_KEY,
};

pub use favorites::FavoritesStore;
pub use settings::SettingsStore;

/// Flags plus the two single-key legacy inputs the runtime stores consume
/// exactly once each.
pub trait LegacyDefaults: FlagStore {
  /// The old serialized list of favorite exercise ids, if any.
  fn legacy_favorite_ids(&self) -> Vec<String>;

  /// The old raw weight-unit code, if any.
  fn legacy_weight_unit(&self) -> Option<String>;
}

impl LegacyDefaults for FileDefaults {
  fn legacy_favorite_ids(&self) -> Vec<String> {
    self.string_list(LEGACY_FAVORITES_KEY)
  }

  fn legacy_weight_unit(&self) -> Option<String> {
    self.string(LEGACY_WEIGHT_UNIT_KEY)
  }
}
