//! The resolved settings snapshot.

use std::sync::Arc;

use chrono::Utc;
use liftlog_core::{
  flags::{FlagStore as _, MIGRATED_SETTINGS},
  model::{UserSettings, WeightUnit},
  store::LogStore,
};
use liftlog_store_sqlite::SqliteStore;
use tracing::warn;

use crate::LegacyDefaults;

/// The single resolved settings record, cached in memory.
///
/// Binding collapses any duplicate records (newest `updated_at` wins), seeds
/// the first structured record from the legacy unit string exactly once, and
/// normalises unknown unit codes back to kilograms. Unit updates write
/// through optimistically; a failed write reloads from the store — the same
/// self-healing rule the favorites cache uses.
pub struct SettingsStore<D> {
  defaults: Arc<D>,
  bound:    Option<SqliteStore>,
  settings: Option<UserSettings>,
  unit:     WeightUnit,
}

impl<D: LegacyDefaults> SettingsStore<D> {
  pub fn new(defaults: Arc<D>) -> Self {
    Self {
      defaults,
      bound: None,
      settings: None,
      unit: WeightUnit::default(),
    }
  }

  pub fn weight_unit(&self) -> WeightUnit { self.unit }

  /// Bind to `store` and resolve the canonical settings record. Rebinding
  /// to the same store instance is a no-op.
  pub async fn bind(&mut self, store: &SqliteStore) {
    if let Some(bound) = &self.bound
      && bound.fingerprint() == store.fingerprint()
    {
      return;
    }
    self.bound = Some(store.clone());
    self.resolve().await;
  }

  /// Switch the preferred unit, writing through immediately.
  pub async fn update_weight_unit(&mut self, unit: WeightUnit) {
    if unit == self.unit {
      return;
    }
    self.unit = unit;

    let Some(store) = self.bound.clone() else { return };

    let result = match &mut self.settings {
      Some(record) => {
        record.weight_unit_raw = unit.as_raw().to_owned();
        record.updated_at = Utc::now();
        store.update_settings(record.clone()).await
      }
      None => {
        let record = UserSettings::new(unit.as_raw());
        let result = store.insert_settings(record.clone()).await;
        if result.is_ok() {
          self.settings = Some(record);
        }
        result
      }
    };

    if let Err(e) = result {
      warn!(%e, "settings write failed; reloading");
      self.reload().await;
    }
  }

  /// Re-resolve the snapshot from the bound store.
  pub async fn reload(&mut self) {
    let Some(store) = self.bound.clone() else { return };
    match store.collapse_settings().await {
      Ok(record) => {
        self.unit =
          record.as_ref().map(UserSettings::weight_unit).unwrap_or_default();
        self.settings = record;
      }
      Err(e) => warn!(%e, "settings reload failed"),
    }
  }

  async fn resolve(&mut self) {
    let Some(store) = self.bound.clone() else { return };

    // Duplicates can appear at any time (concurrent writers); collapse on
    // every bind, not just during migration. If the collapse itself fails
    // the store's contents are unknown — stop here rather than seed a
    // default record that could outrank whatever is actually stored.
    let mut primary = match store.collapse_settings().await {
      Ok(record) => record,
      Err(e) => {
        warn!(%e, "settings collapse failed; leaving defaults unbound");
        return;
      }
    };

    // One-shot seed from the legacy unit string. The destination record
    // wins if one already exists; either way the legacy key is consumed.
    if !self.defaults.get(MIGRATED_SETTINGS) {
      if primary.is_none() {
        let raw = self
          .defaults
          .legacy_weight_unit()
          .unwrap_or_else(|| WeightUnit::default().as_raw().to_owned());
        let record = UserSettings::new(raw);
        match store.insert_settings(record.clone()).await {
          Ok(()) => {
            primary = Some(record);
            self.defaults.set(MIGRATED_SETTINGS, true);
          }
          Err(e) => warn!(%e, "legacy settings seed failed"),
        }
      } else {
        self.defaults.set(MIGRATED_SETTINGS, true);
      }
    }

    // No record at all: create the default.
    if primary.is_none() {
      let record = UserSettings::new(WeightUnit::default().as_raw());
      match store.insert_settings(record.clone()).await {
        Ok(()) => primary = Some(record),
        Err(e) => warn!(%e, "default settings create failed"),
      }
    }

    // Normalise a raw code this version does not know back to kilograms.
    if let Some(record) = &mut primary
      && WeightUnit::from_raw(&record.weight_unit_raw).is_none()
    {
      record.weight_unit_raw = WeightUnit::default().as_raw().to_owned();
      record.updated_at = Utc::now();
      if let Err(e) = store.update_settings(record.clone()).await {
        warn!(%e, "settings normalise failed");
      }
    }

    self.unit =
      primary.as_ref().map(UserSettings::weight_unit).unwrap_or_default();
    self.settings = primary;
  }
}
