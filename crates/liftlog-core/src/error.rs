//! Error types for `liftlog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("catalog parse error: {0}")]
  CatalogParse(#[from] serde_json::Error),

  #[error("duplicate exercise id in catalog: {0:?}")]
  DuplicateCatalogId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
