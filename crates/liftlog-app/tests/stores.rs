//! Runtime cache behaviour against in-memory stores.

use std::{
  collections::HashSet,
  sync::{Arc, Mutex},
};

use chrono::{TimeZone, Utc};
use liftlog_app::{FavoritesStore, LegacyDefaults, SettingsStore};
use liftlog_core::{
  flags::{FlagStore, MIGRATED_FAVORITES, MIGRATED_SETTINGS, MemoryFlags},
  model::{FavoriteExercise, UserSettings, WeightUnit},
  store::LogStore,
};
use liftlog_store_sqlite::SqliteStore;
use uuid::Uuid;

/// Defaults fake: in-memory flags plus canned legacy values.
#[derive(Default)]
struct FakeDefaults {
  flags:        MemoryFlags,
  unit:         Mutex<Option<String>>,
  favorite_ids: Mutex<Vec<String>>,
}

impl FakeDefaults {
  fn with_favorites(ids: &[&str]) -> Arc<Self> {
    let fake = Self::default();
    *fake.favorite_ids.lock().unwrap() =
      ids.iter().map(|s| s.to_string()).collect();
    Arc::new(fake)
  }

  fn with_unit(raw: &str) -> Arc<Self> {
    let fake = Self::default();
    *fake.unit.lock().unwrap() = Some(raw.to_owned());
    Arc::new(fake)
  }
}

impl FlagStore for FakeDefaults {
  fn get(&self, key: &str) -> bool { self.flags.get(key) }
  fn set(&self, key: &str, value: bool) { self.flags.set(key, value) }
}

impl LegacyDefaults for FakeDefaults {
  fn legacy_favorite_ids(&self) -> Vec<String> {
    self.favorite_ids.lock().unwrap().clone()
  }

  fn legacy_weight_unit(&self) -> Option<String> {
    self.unit.lock().unwrap().clone()
  }
}

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.unwrap()
}

// ─── Favorites ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn legacy_blob_migrates_once_on_first_bind() {
  let defaults = FakeDefaults::with_favorites(&["bench-press", "squat"]);
  let s = store().await;

  let mut favorites = FavoritesStore::new(defaults.clone());
  favorites.bind(&s).await;

  assert!(favorites.is_favorite("bench-press"));
  assert!(favorites.is_favorite("squat"));
  assert!(defaults.get(MIGRATED_FAVORITES));
  assert_eq!(s.list_favorites().await.unwrap().len(), 2);
}

#[tokio::test]
async fn legacy_blob_unions_with_existing_records() {
  let defaults = FakeDefaults::with_favorites(&["bench-press", "squat"]);
  let s = store().await;
  let existing = FavoriteExercise::new("squat");
  s.insert_favorite(existing.clone()).await.unwrap();

  let mut favorites = FavoritesStore::new(defaults);
  favorites.bind(&s).await;

  let records = s.list_favorites().await.unwrap();
  assert_eq!(records.len(), 2);
  // The pre-existing squat record survived untouched.
  let squat = records.iter().find(|f| f.exercise_id == "squat").unwrap();
  assert_eq!(squat.created_at, existing.created_at);
}

#[tokio::test]
async fn flag_suppresses_legacy_blob() {
  let defaults = FakeDefaults::with_favorites(&["bench-press"]);
  defaults.set(MIGRATED_FAVORITES, true);
  let s = store().await;

  let mut favorites = FavoritesStore::new(defaults);
  favorites.bind(&s).await;

  assert!(favorites.ids().is_empty());
  assert!(s.list_favorites().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_blob_still_sets_the_flag() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;

  let mut favorites = FavoritesStore::new(defaults.clone());
  favorites.bind(&s).await;

  assert!(defaults.get(MIGRATED_FAVORITES));
}

#[tokio::test]
async fn toggle_writes_through_to_the_store() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;

  let mut favorites = FavoritesStore::new(defaults);
  favorites.bind(&s).await;

  favorites.toggle("deadlift").await;
  assert!(favorites.is_favorite("deadlift"));
  assert_eq!(s.list_favorites().await.unwrap().len(), 1);

  favorites.toggle("deadlift").await;
  assert!(!favorites.is_favorite("deadlift"));
  assert!(s.list_favorites().await.unwrap().is_empty());
}

#[tokio::test]
async fn replace_applies_only_the_difference() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;

  let mut favorites = FavoritesStore::new(defaults);
  favorites.bind(&s).await;
  favorites.toggle("deadlift").await;
  favorites.toggle("squat").await;

  let target: HashSet<String> =
    ["squat".to_owned(), "bench-press".to_owned()].into();
  favorites.replace(target.clone()).await;

  assert_eq!(favorites.ids(), &target);
  let stored: HashSet<String> = s
    .list_favorites()
    .await
    .unwrap()
    .into_iter()
    .map(|f| f.exercise_id)
    .collect();
  assert_eq!(stored, target);
}

#[tokio::test]
async fn rebinding_same_store_is_a_no_op() {
  let defaults = FakeDefaults::with_favorites(&["bench-press"]);
  let s = store().await;

  let mut favorites = FavoritesStore::new(defaults);
  favorites.bind(&s).await;
  favorites.toggle("squat").await;

  // Same fingerprint: no reload, cache untouched.
  favorites.bind(&s).await;
  assert!(favorites.is_favorite("squat"));

  // A different store instance does rebind.
  let other = store().await;
  favorites.bind(&other).await;
  assert!(!favorites.is_favorite("squat"));
}

#[tokio::test]
async fn conflicting_toggle_resyncs_from_the_store() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;

  let mut favorites = FavoritesStore::new(defaults);
  favorites.bind(&s).await;

  // A favorite lands in the store behind the cache's back.
  s.insert_favorite(FavoriteExercise::new("deadlift")).await.unwrap();
  assert!(!favorites.is_favorite("deadlift"));

  // The optimistic insert hits the primary key; the failed write reloads
  // the cache, which resyncs with actual store state.
  favorites.toggle("deadlift").await;
  assert!(favorites.is_favorite("deadlift"));
  assert_eq!(s.list_favorites().await.unwrap().len(), 1);
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn legacy_unit_seeds_the_first_record() {
  let defaults = FakeDefaults::with_unit("lb");
  let s = store().await;

  let mut settings = SettingsStore::new(defaults.clone());
  settings.bind(&s).await;

  assert_eq!(settings.weight_unit(), WeightUnit::Lb);
  assert!(defaults.get(MIGRATED_SETTINGS));

  let records = s.list_settings().await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].weight_unit_raw, "lb");
}

#[tokio::test]
async fn existing_record_wins_over_legacy_unit() {
  let defaults = FakeDefaults::with_unit("lb");
  let s = store().await;
  s.insert_settings(UserSettings::new("kg")).await.unwrap();

  let mut settings = SettingsStore::new(defaults.clone());
  settings.bind(&s).await;

  assert_eq!(settings.weight_unit(), WeightUnit::Kg);
  // Legacy key is still consumed.
  assert!(defaults.get(MIGRATED_SETTINGS));
  assert_eq!(s.list_settings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicates_collapse_to_newest_on_bind() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;

  let older = UserSettings {
    settings_id:     Uuid::new_v4(),
    weight_unit_raw: "kg".into(),
    updated_at:      Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
  };
  let newer = UserSettings {
    settings_id:     Uuid::new_v4(),
    weight_unit_raw: "lb".into(),
    updated_at:      Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
  };
  s.insert_settings(older).await.unwrap();
  s.insert_settings(newer.clone()).await.unwrap();

  let mut settings = SettingsStore::new(defaults);
  settings.bind(&s).await;

  assert_eq!(settings.weight_unit(), WeightUnit::Lb);
  let records = s.list_settings().await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].settings_id, newer.settings_id);
}

#[tokio::test]
async fn unknown_unit_code_normalises_to_kg() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;
  s.insert_settings(UserSettings::new("stone")).await.unwrap();

  let mut settings = SettingsStore::new(defaults);
  settings.bind(&s).await;

  assert_eq!(settings.weight_unit(), WeightUnit::Kg);
  let records = s.list_settings().await.unwrap();
  assert_eq!(records[0].weight_unit_raw, "kg");
}

#[tokio::test]
async fn no_legacy_no_records_creates_default() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;

  let mut settings = SettingsStore::new(defaults.clone());
  settings.bind(&s).await;

  assert_eq!(settings.weight_unit(), WeightUnit::Kg);
  assert!(defaults.get(MIGRATED_SETTINGS));
  assert_eq!(s.list_settings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unit_update_writes_through() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;

  let mut settings = SettingsStore::new(defaults);
  settings.bind(&s).await;
  let before = s.list_settings().await.unwrap()[0].clone();

  settings.update_weight_unit(WeightUnit::Lb).await;
  assert_eq!(settings.weight_unit(), WeightUnit::Lb);

  let after = s.list_settings().await.unwrap();
  assert_eq!(after.len(), 1);
  assert_eq!(after[0].settings_id, before.settings_id);
  assert_eq!(after[0].weight_unit_raw, "lb");
  assert!(after[0].updated_at > before.updated_at);
}

#[tokio::test]
async fn failed_unit_write_reloads_the_snapshot() {
  let defaults = Arc::new(FakeDefaults::default());
  let s = store().await;

  let mut settings = SettingsStore::new(defaults);
  settings.bind(&s).await;

  // A newer record appears behind the cache's back, and a collapse deletes
  // the one the cache is holding.
  let newer = UserSettings {
    settings_id:     Uuid::new_v4(),
    weight_unit_raw: "kg".into(),
    updated_at:      Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
  };
  s.insert_settings(newer.clone()).await.unwrap();
  s.collapse_settings().await.unwrap();

  // The optimistic update targets the deleted record; the failed write
  // reloads, dropping the optimistic unit in favor of stored state.
  settings.update_weight_unit(WeightUnit::Lb).await;
  assert_eq!(settings.weight_unit(), WeightUnit::Kg);

  let records = s.list_settings().await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].settings_id, newer.settings_id);
  assert_eq!(records[0].weight_unit_raw, "kg");
}

#[tokio::test]
async fn unreadable_settings_leave_the_store_untouched() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("liftlog.db");
  let s = SqliteStore::open(&path).await.unwrap();

  // A row no current version can decode makes every settings read fail.
  let raw = rusqlite::Connection::open(&path).unwrap();
  raw
    .execute(
      "INSERT INTO user_settings (settings_id, weight_unit, updated_at)
       VALUES ('not-a-uuid', 'lb', 'not-a-timestamp')",
      [],
    )
    .unwrap();

  let defaults = Arc::new(FakeDefaults::default());
  let mut settings = SettingsStore::new(defaults);
  settings.bind(&s).await;

  // Binding falls back to defaults without writing: seeding a fresh record
  // here could outrank whatever the broken row actually holds.
  assert_eq!(settings.weight_unit(), WeightUnit::Kg);
  let count: i64 = raw
    .query_row("SELECT COUNT(*) FROM user_settings", [], |row| row.get(0))
    .unwrap();
  assert_eq!(count, 1);
}
