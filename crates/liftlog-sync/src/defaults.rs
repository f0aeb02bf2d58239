//! A durable key-value defaults file.
//!
//! Backs the migration flags and the legacy single-key inputs (the favorites
//! blob and the old weight-unit string). Stored as one JSON object, written
//! atomically via a temp-file rename. Persistence is best-effort for flags:
//! a failed write is logged, not surfaced.

use std::{
  fs,
  path::{Path, PathBuf},
  sync::Mutex,
};

use liftlog_core::flags::FlagStore;
use serde_json::{Map, Value};
use tracing::warn;

use crate::Result;

/// Legacy key holding a JSON list of favorite exercise ids.
pub const LEGACY_FAVORITES_KEY: &str = "favoriteExerciseIDs";
/// Legacy key holding the raw weight-unit code.
pub const LEGACY_WEIGHT_UNIT_KEY: &str = "weightUnit";

/// JSON-file-backed defaults store.
pub struct FileDefaults {
  path:   PathBuf,
  values: Mutex<Map<String, Value>>,
}

impl FileDefaults {
  /// Load the defaults at `path`; a missing file is an empty store.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let values = match fs::read_to_string(&path) {
      Ok(text) => serde_json::from_str(&text)?,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
      Err(e) => return Err(e.into()),
    };
    Ok(Self { path, values: Mutex::new(values) })
  }

  pub fn bool(&self, key: &str) -> bool {
    self
      .values
      .lock()
      .expect("defaults lock")
      .get(key)
      .and_then(Value::as_bool)
      .unwrap_or(false)
  }

  pub fn set_bool(&self, key: &str, value: bool) -> Result<()> {
    self.put(key, Value::Bool(value))
  }

  pub fn string(&self, key: &str) -> Option<String> {
    self
      .values
      .lock()
      .expect("defaults lock")
      .get(key)
      .and_then(Value::as_str)
      .map(str::to_owned)
  }

  pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
    self.put(key, Value::String(value.to_owned()))
  }

  /// A JSON list of strings under `key`; missing or malformed reads as empty,
  /// matching the "legacy source absent" silent no-op.
  pub fn string_list(&self, key: &str) -> Vec<String> {
    let values = self.values.lock().expect("defaults lock");
    let Some(Value::Array(items)) = values.get(key) else {
      return vec![];
    };
    items
      .iter()
      .filter_map(Value::as_str)
      .map(str::to_owned)
      .collect()
  }

  pub fn set_string_list(&self, key: &str, items: &[String]) -> Result<()> {
    let array =
      items.iter().map(|s| Value::String(s.clone())).collect::<Vec<_>>();
    self.put(key, Value::Array(array))
  }

  fn put(&self, key: &str, value: Value) -> Result<()> {
    let snapshot = {
      let mut values = self.values.lock().expect("defaults lock");
      values.insert(key.to_owned(), value);
      values.clone()
    };
    self.persist(&snapshot)
  }

  /// Write the whole map atomically: temp file in the same directory, then
  /// rename over the target.
  fn persist(&self, values: &Map<String, Value>) -> Result<()> {
    let tmp = self.path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
    fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}

impl FlagStore for FileDefaults {
  fn get(&self, key: &str) -> bool { self.bool(key) }

  fn set(&self, key: &str, value: bool) {
    if let Err(e) = self.set_bool(key, value) {
      warn!(key, %e, "failed to persist flag");
    }
  }
}
