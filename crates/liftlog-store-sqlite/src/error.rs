//! Error type for `liftlog-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("workout not found: {0}")]
  WorkoutNotFound(Uuid),

  #[error("settings record not found: {0}")]
  SettingsNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
