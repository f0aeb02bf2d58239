//! Domain records for the LiftLog store.
//!
//! Record identity is assigned once, at creation, and survives any copy
//! between stores — the migration machinery relies on stable ids to detect
//! what has already been moved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Weight unit ─────────────────────────────────────────────────────────────

/// The unit a user wants weights displayed in. Stored weights are always
/// kilograms; this only affects presentation.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
  #[default]
  Kg,
  Lb,
}

impl WeightUnit {
  pub fn as_raw(self) -> &'static str {
    match self {
      Self::Kg => "kg",
      Self::Lb => "lb",
    }
  }

  /// Parse a stored raw code. Returns `None` for codes this version does not
  /// know; callers normalise those back to [`WeightUnit::Kg`].
  pub fn from_raw(raw: &str) -> Option<Self> {
    match raw {
      "kg" => Some(Self::Kg),
      "lb" => Some(Self::Lb),
      _ => None,
    }
  }
}

// ─── Workout ─────────────────────────────────────────────────────────────────

/// One logged training session. The date, truncated to day, is the natural
/// grouping key: callers keep at most one workout per calendar day per store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
  pub workout_id: Uuid,
  pub date:       DateTime<Utc>,
  pub note:       Option<String>,
  /// Owned exclusively by this workout; deleted with it.
  pub sets:       Vec<ExerciseSet>,
}

impl Workout {
  pub fn new(
    date: DateTime<Utc>,
    note: Option<String>,
    sets: Vec<ExerciseSet>,
  ) -> Self {
    Self { workout_id: Uuid::new_v4(), date, note, sets }
  }
}

/// A single set within a workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSet {
  pub set_id:           Uuid,
  /// Key into the read-only exercise catalog.
  pub exercise_id:      String,
  /// Kilograms — the canonical stored unit.
  pub weight_kg:        f64,
  pub reps:             i32,
  pub duration_seconds: Option<i32>,
  /// Rating of perceived exertion, typically 1–10.
  pub rpe:              Option<f64>,
  pub created_at:       DateTime<Utc>,
}

impl ExerciseSet {
  pub fn new(exercise_id: impl Into<String>, weight_kg: f64, reps: i32) -> Self {
    Self {
      set_id:           Uuid::new_v4(),
      exercise_id:      exercise_id.into(),
      weight_kg,
      reps,
      duration_seconds: None,
      rpe:              None,
      created_at:       Utc::now(),
    }
  }
}

// ─── Favorites ───────────────────────────────────────────────────────────────

/// A starred exercise. Identity is the exercise id itself — at most one
/// record per exercise id exists in a store (PRIMARY KEY enforced).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteExercise {
  pub exercise_id: String,
  pub created_at:  DateTime<Utc>,
}

impl FavoriteExercise {
  pub fn new(exercise_id: impl Into<String>) -> Self {
    Self { exercise_id: exercise_id.into(), created_at: Utc::now() }
  }
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// User settings — a singleton by convention, not by constraint. Concurrent
/// writers can leave duplicates behind; they are collapsed on every store
/// bind, keeping the record with the newest `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
  pub settings_id:     Uuid,
  /// Raw unit code (`"kg"` / `"lb"`); unknown codes normalise to `"kg"`.
  pub weight_unit_raw: String,
  pub updated_at:      DateTime<Utc>,
}

impl UserSettings {
  pub fn new(weight_unit_raw: impl Into<String>) -> Self {
    Self {
      settings_id:     Uuid::new_v4(),
      weight_unit_raw: weight_unit_raw.into(),
      updated_at:      Utc::now(),
    }
  }

  pub fn weight_unit(&self) -> WeightUnit {
    WeightUnit::from_raw(&self.weight_unit_raw).unwrap_or_default()
  }
}
