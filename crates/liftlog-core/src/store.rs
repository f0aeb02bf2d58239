//! The `LogStore` trait.
//!
//! Implemented by storage backends (e.g. `liftlog-store-sqlite`). The sync
//! and app layers depend on this abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used from
//! multi-threaded async runtimes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  model::{ExerciseSet, FavoriteExercise, UserSettings, Workout},
  reconcile::MigrationPlan,
};

/// Abstraction over a LiftLog storage backend.
///
/// A store holds four collections under one schema: workouts (with their
/// owned sets), favorite exercises, and the settings singleton. Two stores —
/// a legacy local one and the active one — may be open at the same time
/// during migration.
pub trait LogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Workouts ──────────────────────────────────────────────────────────

  /// All workouts with their sets, ordered by date ascending.
  fn list_workouts(
    &self,
  ) -> impl Future<Output = Result<Vec<Workout>, Self::Error>> + Send + '_;

  /// A single workout by id, with its sets. `None` if not found.
  fn get_workout(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Workout>, Self::Error>> + Send + '_;

  /// Insert a workout and its nested sets, preserving every caller-supplied
  /// id. Ids are never regenerated on insert.
  fn insert_workout(
    &self,
    workout: Workout,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a workout; its sets go with it.
  fn delete_workout(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append a set to an existing workout.
  fn add_set(
    &self,
    workout_id: Uuid,
    set: ExerciseSet,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_set(
    &self,
    set_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Favorites ─────────────────────────────────────────────────────────

  fn list_favorites(
    &self,
  ) -> impl Future<Output = Result<Vec<FavoriteExercise>, Self::Error>> + Send + '_;

  /// Insert a favorite. Fails if one already exists for the exercise id —
  /// uniqueness per exercise id is a hard invariant.
  fn insert_favorite(
    &self,
    favorite: FavoriteExercise,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_favorite(
    &self,
    exercise_id: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  fn list_settings(
    &self,
  ) -> impl Future<Output = Result<Vec<UserSettings>, Self::Error>> + Send + '_;

  fn insert_settings(
    &self,
    settings: UserSettings,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite an existing settings record in place (matched by id).
  fn update_settings(
    &self,
    settings: UserSettings,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Collapse duplicate settings records to one canonical record — the one
  /// with the newest `updated_at` — deleting the rest in one transaction.
  /// Returns the canonical record, if any exists.
  fn collapse_settings(
    &self,
  ) -> impl Future<Output = Result<Option<UserSettings>, Self::Error>> + Send + '_;

  // ── Migration ─────────────────────────────────────────────────────────

  /// Apply every write in `plan` atomically: one transaction, one commit.
  /// An empty plan must not open a write transaction at all.
  fn apply_plan(
    &self,
    plan: MigrationPlan,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
