//! The in-memory favorites cache.

use std::{collections::HashSet, sync::Arc};

use liftlog_core::{
  flags::{FlagStore as _, MIGRATED_FAVORITES},
  model::FavoriteExercise,
  store::LogStore,
};
use liftlog_store_sqlite::SqliteStore;
use tracing::warn;

use crate::LegacyDefaults;

/// Favorite exercise ids, cached in memory and written through to the bound
/// store. Mutations are optimistic; a failed write reloads the cache from
/// the store, so drift self-heals.
pub struct FavoritesStore<D> {
  defaults: Arc<D>,
  bound:    Option<SqliteStore>,
  ids:      HashSet<String>,
}

impl<D: LegacyDefaults> FavoritesStore<D> {
  pub fn new(defaults: Arc<D>) -> Self {
    Self { defaults, bound: None, ids: HashSet::new() }
  }

  /// Bind to `store`, running the one-shot legacy migration and loading the
  /// cache. Rebinding to the same store instance is a no-op.
  pub async fn bind(&mut self, store: &SqliteStore) {
    if let Some(bound) = &self.bound
      && bound.fingerprint() == store.fingerprint()
    {
      return;
    }
    self.bound = Some(store.clone());
    self.migrate_legacy().await;
    self.reload().await;
  }

  pub fn is_favorite(&self, exercise_id: &str) -> bool {
    self.ids.contains(exercise_id)
  }

  pub fn ids(&self) -> &HashSet<String> { &self.ids }

  /// Flip one exercise's favorite status, writing through immediately.
  pub async fn toggle(&mut self, exercise_id: &str) {
    let Some(store) = self.bound.clone() else { return };

    let result = if self.ids.remove(exercise_id) {
      store.delete_favorite(exercise_id.to_owned()).await
    } else {
      self.ids.insert(exercise_id.to_owned());
      store.insert_favorite(FavoriteExercise::new(exercise_id)).await
    };

    if let Err(e) = result {
      warn!(exercise_id, %e, "favorite write failed; reloading");
      self.reload().await;
    }
  }

  /// Replace the whole favorite set, applying only the difference.
  pub async fn replace(&mut self, ids: HashSet<String>) {
    let Some(store) = self.bound.clone() else {
      self.ids = ids;
      return;
    };

    let to_insert: Vec<&String> = ids.difference(&self.ids).collect();
    let to_delete: Vec<&String> = self.ids.difference(&ids).collect();

    let mut failed = false;
    for id in to_insert {
      if let Err(e) = store.insert_favorite(FavoriteExercise::new(id)).await {
        warn!(exercise_id = %id, %e, "favorite insert failed");
        failed = true;
      }
    }
    for id in to_delete {
      if let Err(e) = store.delete_favorite(id.clone()).await {
        warn!(exercise_id = %id, %e, "favorite delete failed");
        failed = true;
      }
    }

    self.ids = ids;
    if failed {
      self.reload().await;
    }
  }

  /// Drop the cache and refill it from the bound store.
  pub async fn reload(&mut self) {
    let Some(store) = self.bound.clone() else { return };
    match store.list_favorites().await {
      Ok(records) => {
        self.ids = records.into_iter().map(|f| f.exercise_id).collect();
      }
      Err(e) => warn!(%e, "favorites reload failed"),
    }
  }

  /// One-shot migration of the legacy favorites blob into the store.
  /// The flag flips only once every missing id is inserted, so a failed
  /// attempt retries on a later launch.
  async fn migrate_legacy(&mut self) {
    let Some(store) = self.bound.clone() else { return };
    if self.defaults.get(MIGRATED_FAVORITES) {
      return;
    }

    let legacy: HashSet<String> =
      self.defaults.legacy_favorite_ids().into_iter().collect();
    if legacy.is_empty() {
      self.defaults.set(MIGRATED_FAVORITES, true);
      return;
    }

    let existing: HashSet<String> = match store.list_favorites().await {
      Ok(records) => records.into_iter().map(|f| f.exercise_id).collect(),
      Err(e) => {
        warn!(%e, "legacy favorites migration: list failed");
        return;
      }
    };

    for id in legacy.difference(&existing) {
      if let Err(e) = store.insert_favorite(FavoriteExercise::new(id)).await {
        warn!(exercise_id = %id, %e, "legacy favorites migration: insert failed");
        return;
      }
    }

    self.defaults.set(MIGRATED_FAVORITES, true);
  }
}
