//! SQL schema for the LiftLog SQLite store.
//!
//! Executed once at connection startup. Both the legacy local store and the
//! cloud-synced store share this schema — migration transplants rows between
//! two independently opened databases of the same shape.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS workouts (
    workout_id  TEXT PRIMARY KEY,
    date        TEXT NOT NULL,    -- ISO 8601 UTC; truncated to day by callers
    note        TEXT
);

-- Sets are owned by their workout: child lifetime = parent lifetime.
CREATE TABLE IF NOT EXISTS exercise_sets (
    set_id           TEXT PRIMARY KEY,
    workout_id       TEXT NOT NULL REFERENCES workouts(workout_id)
                                   ON DELETE CASCADE,
    exercise_id      TEXT NOT NULL,   -- key into the read-only catalog
    weight_kg        REAL NOT NULL,   -- canonical unit is kilograms
    reps             INTEGER NOT NULL,
    duration_seconds INTEGER,
    rpe              REAL,
    created_at       TEXT NOT NULL
);

-- Identity is the exercise id itself; at most one row per exercise.
CREATE TABLE IF NOT EXISTS favorite_exercises (
    exercise_id TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL
);

-- Singleton by convention. Duplicates are collapsed on every store bind,
-- keeping the row with the newest updated_at.
CREATE TABLE IF NOT EXISTS user_settings (
    settings_id TEXT PRIMARY KEY,
    weight_unit TEXT NOT NULL,    -- raw code: 'kg' | 'lb'
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sets_workout_idx  ON exercise_sets(workout_id);
CREATE INDEX IF NOT EXISTS workouts_date_idx ON workouts(date);

PRAGMA user_version = 1;
";
