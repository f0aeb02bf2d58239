//! Pure reconciliation planning: union-by-identity between two stores.
//!
//! Every function here is a pure set-difference over already-fetched records.
//! The backend applies a [`MigrationPlan`] in a single transaction, so a
//! failed run leaves the flag unset and a re-run recomputes a (possibly
//! smaller) plan from the same rules — the whole pipeline is idempotent.

use std::collections::HashSet;

use uuid::Uuid;

use crate::model::{ExerciseSet, FavoriteExercise, UserSettings, Workout};

// ─── Plan ────────────────────────────────────────────────────────────────────

/// Everything a migration run intends to write to the destination store.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
  pub workouts:  Vec<Workout>,
  pub favorites: Vec<FavoriteExercise>,
  pub settings:  Option<UserSettings>,
}

impl MigrationPlan {
  /// An empty plan needs no write transaction at all.
  pub fn is_empty(&self) -> bool {
    self.workouts.is_empty()
      && self.favorites.is_empty()
      && self.settings.is_none()
  }
}

/// Build the full plan for one source → destination migration run, in the
/// fixed workouts → favorites → settings order.
pub fn plan(
  source_workouts: &[Workout],
  dest_workouts: &[Workout],
  source_favorites: &[FavoriteExercise],
  dest_favorites: &[FavoriteExercise],
  source_settings: &[UserSettings],
  dest_settings: &[UserSettings],
) -> MigrationPlan {
  MigrationPlan {
    workouts:  missing_workouts(source_workouts, dest_workouts),
    favorites: missing_favorites(source_favorites, dest_favorites),
    settings:  settings_candidate(source_settings, dest_settings),
  }
}

// ─── Workouts ────────────────────────────────────────────────────────────────

/// Source workouts absent from the destination, compared purely by id.
///
/// Each returned workout is a deep copy that keeps the original workout and
/// set ids — identity must survive the transplant so a later run correctly
/// sees "already migrated", and so downstream joins stay valid across stores.
pub fn missing_workouts(source: &[Workout], dest: &[Workout]) -> Vec<Workout> {
  if source.is_empty() {
    return vec![];
  }

  let existing: HashSet<Uuid> = dest.iter().map(|w| w.workout_id).collect();

  source
    .iter()
    .filter(|w| !existing.contains(&w.workout_id))
    .map(copy_workout)
    .collect()
}

fn copy_workout(workout: &Workout) -> Workout {
  let sets = workout
    .sets
    .iter()
    .map(|set| ExerciseSet {
      set_id:           set.set_id,
      exercise_id:      set.exercise_id.clone(),
      weight_kg:        set.weight_kg,
      reps:             set.reps,
      duration_seconds: set.duration_seconds,
      rpe:              set.rpe,
      created_at:       set.created_at,
    })
    .collect();

  Workout {
    workout_id: workout.workout_id,
    date:       workout.date,
    note:       workout.note.clone(),
    sets,
  }
}

// ─── Favorites ───────────────────────────────────────────────────────────────

/// Source favorites whose exercise id is absent from the destination.
/// Identity is the exercise id itself, so a plain copy suffices.
pub fn missing_favorites(
  source: &[FavoriteExercise],
  dest: &[FavoriteExercise],
) -> Vec<FavoriteExercise> {
  if source.is_empty() {
    return vec![];
  }

  let existing: HashSet<&str> =
    dest.iter().map(|f| f.exercise_id.as_str()).collect();

  source
    .iter()
    .filter(|f| !existing.contains(f.exercise_id.as_str()))
    .cloned()
    .collect()
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// The settings record to carry over, if any.
///
/// The destination always wins: as soon as it holds *any* settings record,
/// nothing is migrated. Otherwise the most recently updated source record is
/// copied verbatim, id included.
pub fn settings_candidate(
  source: &[UserSettings],
  dest: &[UserSettings],
) -> Option<UserSettings> {
  if !dest.is_empty() {
    return None;
  }
  source.iter().max_by_key(|s| s.updated_at).cloned()
}

/// Collapse duplicate settings records down to one canonical record.
///
/// Returns the canonical record (newest `updated_at`) and the ids to delete.
/// This runs on every store bind, not only during migration — duplicates can
/// be produced by concurrent writers at any time.
pub fn collapse_candidates(
  records: &[UserSettings],
) -> (Option<UserSettings>, Vec<Uuid>) {
  let mut sorted: Vec<&UserSettings> = records.iter().collect();
  sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

  let mut iter = sorted.into_iter();
  let canonical = iter.next().cloned();
  let doomed = iter.map(|s| s.settings_id).collect();
  (canonical, doomed)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  fn workout_on(day: u32) -> Workout {
    let date = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
    Workout::new(date, None, vec![ExerciseSet::new("bench-press", 60.0, 5)])
  }

  fn settings_at(raw: &str, day: u32) -> UserSettings {
    UserSettings {
      settings_id:     Uuid::new_v4(),
      weight_unit_raw: raw.into(),
      updated_at:      Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
    }
  }

  // ── Workouts ──────────────────────────────────────────────────────────────

  #[test]
  fn empty_source_is_a_fast_path() {
    let dest = vec![workout_on(1)];
    assert!(missing_workouts(&[], &dest).is_empty());
  }

  #[test]
  fn missing_workouts_is_set_difference_by_id() {
    let shared = workout_on(1);
    let only_source = workout_on(2);
    let only_dest = workout_on(3);

    let source = vec![shared.clone(), only_source.clone()];
    let dest = vec![shared, only_dest];

    let missing = missing_workouts(&source, &dest);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].workout_id, only_source.workout_id);
  }

  #[test]
  fn workout_copy_preserves_all_ids_and_fields() {
    let mut original = workout_on(5);
    original.note = Some("deload".into());
    original.sets[0].duration_seconds = Some(45);
    original.sets[0].rpe = Some(8.5);

    let copied = &missing_workouts(std::slice::from_ref(&original), &[])[0];
    assert_eq!(copied.workout_id, original.workout_id);
    assert_eq!(copied.date, original.date);
    assert_eq!(copied.note.as_deref(), Some("deload"));

    let (a, b) = (&copied.sets[0], &original.sets[0]);
    assert_eq!(a.set_id, b.set_id);
    assert_eq!(a.exercise_id, b.exercise_id);
    assert_eq!(a.weight_kg, b.weight_kg);
    assert_eq!(a.reps, b.reps);
    assert_eq!(a.duration_seconds, b.duration_seconds);
    assert_eq!(a.rpe, b.rpe);
    assert_eq!(a.created_at, b.created_at);
  }

  #[test]
  fn planning_twice_with_union_applied_yields_nothing() {
    let source = vec![workout_on(1), workout_on(2)];
    let dest = vec![workout_on(3)];

    let first = missing_workouts(&source, &dest);
    let mut after: Vec<Workout> = dest.clone();
    after.extend(first);

    assert!(missing_workouts(&source, &after).is_empty());
    assert_eq!(after.len(), 3);
  }

  // ── Favorites ─────────────────────────────────────────────────────────────

  #[test]
  fn favorites_difference_by_exercise_id() {
    let source =
      vec![FavoriteExercise::new("bench-press"), FavoriteExercise::new("squat")];
    let dest = vec![FavoriteExercise::new("squat")];

    let missing = missing_favorites(&source, &dest);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].exercise_id, "bench-press");
  }

  #[test]
  fn favorites_empty_source_no_op() {
    assert!(missing_favorites(&[], &[FavoriteExercise::new("squat")]).is_empty());
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  #[test]
  fn destination_settings_always_win() {
    let source = vec![settings_at("lb", 20)];
    let dest = vec![settings_at("kg", 1)];
    assert!(settings_candidate(&source, &dest).is_none());
  }

  #[test]
  fn newest_source_settings_is_the_candidate() {
    let old = settings_at("kg", 1);
    let new = settings_at("lb", 9);
    let candidate =
      settings_candidate(&[old, new.clone()], &[]).expect("candidate");
    assert_eq!(candidate.settings_id, new.settings_id);
    assert_eq!(candidate.weight_unit_raw, "lb");
  }

  #[test]
  fn no_source_settings_no_candidate() {
    assert!(settings_candidate(&[], &[]).is_none());
  }

  #[test]
  fn collapse_keeps_newest_and_dooms_the_rest() {
    let a = settings_at("kg", 1);
    let b = settings_at("lb", 9);
    let c = settings_at("kg", 4);

    let (canonical, doomed) =
      collapse_candidates(&[a.clone(), b.clone(), c.clone()]);
    assert_eq!(canonical.unwrap().settings_id, b.settings_id);
    assert_eq!(doomed.len(), 2);
    assert!(doomed.contains(&a.settings_id));
    assert!(doomed.contains(&c.settings_id));
  }

  #[test]
  fn collapse_of_empty_and_singleton() {
    let (none, doomed) = collapse_candidates(&[]);
    assert!(none.is_none());
    assert!(doomed.is_empty());

    let only = settings_at("kg", 2);
    let (one, doomed) = collapse_candidates(std::slice::from_ref(&only));
    assert_eq!(one.unwrap().settings_id, only.settings_id);
    assert!(doomed.is_empty());
  }

  // ── Plan ──────────────────────────────────────────────────────────────────

  #[test]
  fn empty_plan_when_stores_agree() {
    let w = workout_on(1);
    let f = FavoriteExercise::new("squat");
    let s = settings_at("kg", 1);

    let plan = plan(
      std::slice::from_ref(&w),
      std::slice::from_ref(&w),
      std::slice::from_ref(&f),
      std::slice::from_ref(&f),
      std::slice::from_ref(&s),
      std::slice::from_ref(&s),
    );
    assert!(plan.is_empty());
  }
}
