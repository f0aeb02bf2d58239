//! Error type for `liftlog-sync`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[from] liftlog_store_sqlite::Error),

  /// Neither the cloud-synced nor the local-only store could be opened.
  /// There is no recovery path — the app cannot function without a store.
  #[error("no usable store could be opened")]
  NoUsableStore,

  #[error("defaults file error: {0}")]
  Io(#[from] std::io::Error),

  #[error("defaults encode error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
