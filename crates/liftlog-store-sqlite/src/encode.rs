//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use liftlog_core::model::{ExerciseSet, FavoriteExercise, UserSettings, Workout};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A `workouts` row as read from SQLite, before decoding.
pub struct RawWorkout {
  pub workout_id: String,
  pub date:       String,
  pub note:       Option<String>,
}

impl RawWorkout {
  /// Decode into a [`Workout`] shell; the caller attaches the sets.
  pub fn into_workout(self, sets: Vec<ExerciseSet>) -> Result<Workout> {
    Ok(Workout {
      workout_id: decode_uuid(&self.workout_id)?,
      date:       decode_dt(&self.date)?,
      note:       self.note,
      sets,
    })
  }
}

/// An `exercise_sets` row as read from SQLite.
pub struct RawSet {
  pub set_id:           String,
  pub workout_id:       String,
  pub exercise_id:      String,
  pub weight_kg:        f64,
  pub reps:             i32,
  pub duration_seconds: Option<i32>,
  pub rpe:              Option<f64>,
  pub created_at:       String,
}

impl RawSet {
  /// Decode into the owning workout's id and the set itself.
  pub fn into_set(self) -> Result<(Uuid, ExerciseSet)> {
    let parent = decode_uuid(&self.workout_id)?;
    let set = ExerciseSet {
      set_id:           decode_uuid(&self.set_id)?,
      exercise_id:      self.exercise_id,
      weight_kg:        self.weight_kg,
      reps:             self.reps,
      duration_seconds: self.duration_seconds,
      rpe:              self.rpe,
      created_at:       decode_dt(&self.created_at)?,
    };
    Ok((parent, set))
  }
}

/// A `favorite_exercises` row as read from SQLite.
pub struct RawFavorite {
  pub exercise_id: String,
  pub created_at:  String,
}

impl RawFavorite {
  pub fn into_favorite(self) -> Result<FavoriteExercise> {
    Ok(FavoriteExercise {
      exercise_id: self.exercise_id,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// A `user_settings` row as read from SQLite.
pub struct RawSettings {
  pub settings_id: String,
  pub weight_unit: String,
  pub updated_at:  String,
}

impl RawSettings {
  pub fn into_settings(self) -> Result<UserSettings> {
    Ok(UserSettings {
      settings_id:     decode_uuid(&self.settings_id)?,
      weight_unit_raw: self.weight_unit,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}
