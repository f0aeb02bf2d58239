//! [`SqliteStore`] — the SQLite implementation of [`LogStore`].

use std::{collections::HashMap, path::Path};

use liftlog_core::{
  model::{ExerciseSet, FavoriteExercise, UserSettings, Workout},
  reconcile::{self, MigrationPlan},
  store::LogStore,
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{
    RawFavorite, RawSet, RawSettings, RawWorkout, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A LiftLog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The
/// fingerprint identifies one opened store instance so runtime caches can
/// tell "rebound to the same store" from "bound to a different one".
#[derive(Debug, Clone)]
pub struct SqliteStore {
  conn:        tokio_rusqlite::Connection,
  fingerprint: Uuid,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, fingerprint: Uuid::new_v4() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, fingerprint: Uuid::new_v4() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Identity of this opened store instance. Clones share it.
  pub fn fingerprint(&self) -> Uuid { self.fingerprint }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row encoding ────────────────────────────────────────────────────────────

fn workout_rows(workout: &Workout) -> (RawWorkout, Vec<RawSet>) {
  let raw = RawWorkout {
    workout_id: encode_uuid(workout.workout_id),
    date:       encode_dt(workout.date),
    note:       workout.note.clone(),
  };
  let sets = workout
    .sets
    .iter()
    .map(|set| set_row(workout.workout_id, set))
    .collect();
  (raw, sets)
}

fn set_row(workout_id: Uuid, set: &ExerciseSet) -> RawSet {
  RawSet {
    set_id:           encode_uuid(set.set_id),
    workout_id:       encode_uuid(workout_id),
    exercise_id:      set.exercise_id.clone(),
    weight_kg:        set.weight_kg,
    reps:             set.reps,
    duration_seconds: set.duration_seconds,
    rpe:              set.rpe,
    created_at:       encode_dt(set.created_at),
  }
}

fn favorite_row(favorite: &FavoriteExercise) -> RawFavorite {
  RawFavorite {
    exercise_id: favorite.exercise_id.clone(),
    created_at:  encode_dt(favorite.created_at),
  }
}

fn settings_row(settings: &UserSettings) -> RawSettings {
  RawSettings {
    settings_id: encode_uuid(settings.settings_id),
    weight_unit: settings.weight_unit_raw.clone(),
    updated_at:  encode_dt(settings.updated_at),
  }
}

// ─── SQL helpers (shared by single inserts and the migration transaction) ────

fn insert_workout_sql(
  conn: &rusqlite::Connection,
  raw: &RawWorkout,
  sets: &[RawSet],
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO workouts (workout_id, date, note) VALUES (?1, ?2, ?3)",
    rusqlite::params![raw.workout_id, raw.date, raw.note],
  )?;
  for set in sets {
    insert_set_sql(conn, set)?;
  }
  Ok(())
}

fn insert_set_sql(
  conn: &rusqlite::Connection,
  set: &RawSet,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO exercise_sets (
       set_id, workout_id, exercise_id, weight_kg, reps,
       duration_seconds, rpe, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      set.set_id,
      set.workout_id,
      set.exercise_id,
      set.weight_kg,
      set.reps,
      set.duration_seconds,
      set.rpe,
      set.created_at,
    ],
  )?;
  Ok(())
}

fn insert_favorite_sql(
  conn: &rusqlite::Connection,
  favorite: &RawFavorite,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO favorite_exercises (exercise_id, created_at) VALUES (?1, ?2)",
    rusqlite::params![favorite.exercise_id, favorite.created_at],
  )?;
  Ok(())
}

fn insert_settings_sql(
  conn: &rusqlite::Connection,
  settings: &RawSettings,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO user_settings (settings_id, weight_unit, updated_at)
     VALUES (?1, ?2, ?3)",
    rusqlite::params![
      settings.settings_id,
      settings.weight_unit,
      settings.updated_at,
    ],
  )?;
  Ok(())
}

fn query_sets(
  conn: &rusqlite::Connection,
  workout_id: Option<&str>,
) -> rusqlite::Result<Vec<RawSet>> {
  let base = "SELECT set_id, workout_id, exercise_id, weight_kg, reps,
                     duration_seconds, rpe, created_at
              FROM exercise_sets";
  let map_row = |row: &rusqlite::Row<'_>| {
    Ok(RawSet {
      set_id:           row.get(0)?,
      workout_id:       row.get(1)?,
      exercise_id:      row.get(2)?,
      weight_kg:        row.get(3)?,
      reps:             row.get(4)?,
      duration_seconds: row.get(5)?,
      rpe:              row.get(6)?,
      created_at:       row.get(7)?,
    })
  };

  if let Some(id) = workout_id {
    let sql = format!("{base} WHERE workout_id = ?1 ORDER BY created_at ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params![id], map_row)?;
    rows.collect()
  } else {
    let sql = format!("{base} ORDER BY created_at ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
  }
}

fn query_settings(
  conn: &rusqlite::Connection,
) -> rusqlite::Result<Vec<RawSettings>> {
  let mut stmt = conn.prepare(
    "SELECT settings_id, weight_unit, updated_at FROM user_settings",
  )?;
  let rows = stmt.query_map([], |row| {
    Ok(RawSettings {
      settings_id: row.get(0)?,
      weight_unit: row.get(1)?,
      updated_at:  row.get(2)?,
    })
  })?;
  rows.collect()
}

/// Group decoded sets under their parent workout id.
fn assemble_workouts(
  raw_workouts: Vec<RawWorkout>,
  raw_sets: Vec<RawSet>,
) -> Result<Vec<Workout>> {
  let mut by_parent: HashMap<Uuid, Vec<ExerciseSet>> = HashMap::new();
  for raw in raw_sets {
    let (parent, set) = raw.into_set()?;
    by_parent.entry(parent).or_default().push(set);
  }

  raw_workouts
    .into_iter()
    .map(|raw| {
      let id = Uuid::parse_str(&raw.workout_id)?;
      let sets = by_parent.remove(&id).unwrap_or_default();
      raw.into_workout(sets)
    })
    .collect()
}

// ─── LogStore impl ───────────────────────────────────────────────────────────

impl LogStore for SqliteStore {
  type Error = Error;

  // ── Workouts ──────────────────────────────────────────────────────────────

  async fn list_workouts(&self) -> Result<Vec<Workout>> {
    let (raw_workouts, raw_sets) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT workout_id, date, note FROM workouts ORDER BY date ASC",
        )?;
        let workouts = stmt
          .query_map([], |row| {
            Ok(RawWorkout {
              workout_id: row.get(0)?,
              date:       row.get(1)?,
              note:       row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let sets = query_sets(conn, None)?;
        Ok((workouts, sets))
      })
      .await?;

    assemble_workouts(raw_workouts, raw_sets)
  }

  async fn get_workout(&self, id: Uuid) -> Result<Option<Workout>> {
    let id_str = encode_uuid(id);

    let found: Option<(RawWorkout, Vec<RawSet>)> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT workout_id, date, note FROM workouts WHERE workout_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawWorkout {
                workout_id: row.get(0)?,
                date:       row.get(1)?,
                note:       row.get(2)?,
              })
            },
          )
          .optional()?;

        match raw {
          Some(raw) => {
            let sets = query_sets(conn, Some(&id_str))?;
            Ok(Some((raw, sets)))
          }
          None => Ok(None),
        }
      })
      .await?;

    match found {
      Some((raw, raw_sets)) => {
        let workouts = assemble_workouts(vec![raw], raw_sets)?;
        Ok(workouts.into_iter().next())
      }
      None => Ok(None),
    }
  }

  async fn insert_workout(&self, workout: Workout) -> Result<()> {
    let (raw, sets) = workout_rows(&workout);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        insert_workout_sql(&tx, &raw, &sets)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_workout(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        // Sets go with the workout via ON DELETE CASCADE.
        conn.execute(
          "DELETE FROM workouts WHERE workout_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_set(&self, workout_id: Uuid, set: ExerciseSet) -> Result<()> {
    let raw = set_row(workout_id, &set);
    let parent_str = encode_uuid(workout_id);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM workouts WHERE workout_id = ?1",
            rusqlite::params![parent_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok(false);
        }
        insert_set_sql(conn, &raw)?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::WorkoutNotFound(workout_id));
    }
    Ok(())
  }

  async fn delete_set(&self, set_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(set_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM exercise_sets WHERE set_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Favorites ─────────────────────────────────────────────────────────────

  async fn list_favorites(&self) -> Result<Vec<FavoriteExercise>> {
    let raws: Vec<RawFavorite> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT exercise_id, created_at FROM favorite_exercises
           ORDER BY created_at ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawFavorite {
              exercise_id: row.get(0)?,
              created_at:  row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFavorite::into_favorite).collect()
  }

  async fn insert_favorite(&self, favorite: FavoriteExercise) -> Result<()> {
    let raw = favorite_row(&favorite);
    self
      .conn
      .call(move |conn| {
        insert_favorite_sql(conn, &raw)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_favorite(&self, exercise_id: String) -> Result<()> {
    let id = exercise_id;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM favorite_exercises WHERE exercise_id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn list_settings(&self) -> Result<Vec<UserSettings>> {
    let raws: Vec<RawSettings> =
      self.conn.call(|conn| Ok(query_settings(conn)?)).await?;
    raws.into_iter().map(RawSettings::into_settings).collect()
  }

  async fn insert_settings(&self, settings: UserSettings) -> Result<()> {
    let raw = settings_row(&settings);
    self
      .conn
      .call(move |conn| {
        insert_settings_sql(conn, &raw)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_settings(&self, settings: UserSettings) -> Result<()> {
    let raw = settings_row(&settings);
    let id = settings.settings_id;

    let changed: usize = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE user_settings SET weight_unit = ?2, updated_at = ?3
           WHERE settings_id = ?1",
          rusqlite::params![raw.settings_id, raw.weight_unit, raw.updated_at],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Err(Error::SettingsNotFound(id));
    }
    Ok(())
  }

  async fn collapse_settings(&self) -> Result<Option<UserSettings>> {
    let records = self.list_settings().await?;
    let (canonical, doomed) = reconcile::collapse_candidates(&records);

    if !doomed.is_empty() {
      let doomed_strs: Vec<String> =
        doomed.into_iter().map(encode_uuid).collect();
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          for id in &doomed_strs {
            tx.execute(
              "DELETE FROM user_settings WHERE settings_id = ?1",
              rusqlite::params![id],
            )?;
          }
          tx.commit()?;
          Ok(())
        })
        .await?;
    }

    Ok(canonical)
  }

  // ── Migration ─────────────────────────────────────────────────────────────

  async fn apply_plan(&self, plan: MigrationPlan) -> Result<()> {
    // Fast path: nothing to migrate, no write transaction.
    if plan.is_empty() {
      return Ok(());
    }

    let workouts: Vec<(RawWorkout, Vec<RawSet>)> =
      plan.workouts.iter().map(workout_rows).collect();
    let favorites: Vec<RawFavorite> =
      plan.favorites.iter().map(favorite_row).collect();
    let settings: Option<RawSettings> =
      plan.settings.as_ref().map(settings_row);

    self
      .conn
      .call(move |conn| {
        // One transaction, one commit: a failed run leaves the destination
        // untouched and the migration flag unset, so the next launch
        // recomputes a fresh plan and retries.
        let tx = conn.transaction()?;
        for (raw, sets) in &workouts {
          insert_workout_sql(&tx, raw, sets)?;
        }
        for favorite in &favorites {
          insert_favorite_sql(&tx, favorite)?;
        }
        if let Some(raw) = &settings {
          insert_settings_sql(&tx, raw)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
