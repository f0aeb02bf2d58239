//! The read-only exercise catalog.
//!
//! Supplied by an external loader as JSON; the core treats it purely as a
//! lookup table keyed by exercise id and never mutates it.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{Error, Result};

/// One exercise definition as shipped in the catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseDefinition {
  pub id:           String,
  /// Localised display names, keyed by BCP 47 language tag.
  #[serde(default)]
  pub names:        BTreeMap<String, String>,
  pub muscle_group: String,
  pub equipment:    Option<String>,
  pub movement:     Option<String>,
}

impl ExerciseDefinition {
  /// Display name for `lang`, falling back to English, then to any name,
  /// then to the id itself.
  pub fn name(&self, lang: &str) -> &str {
    self
      .names
      .get(lang)
      .or_else(|| self.names.get("en"))
      .or_else(|| self.names.values().next())
      .map(String::as_str)
      .unwrap_or(&self.id)
  }
}

/// An id-indexed catalog of exercise definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
  by_id: BTreeMap<String, ExerciseDefinition>,
}

impl Catalog {
  /// Parse a catalog from its JSON array form. Duplicate ids are rejected —
  /// the catalog is the authority on exercise identity.
  pub fn from_json(json: &str) -> Result<Self> {
    let definitions: Vec<ExerciseDefinition> = serde_json::from_str(json)?;
    let mut by_id = BTreeMap::new();
    for def in definitions {
      if by_id.contains_key(&def.id) {
        return Err(Error::DuplicateCatalogId(def.id));
      }
      by_id.insert(def.id.clone(), def);
    }
    Ok(Self { by_id })
  }

  pub fn get(&self, exercise_id: &str) -> Option<&ExerciseDefinition> {
    self.by_id.get(exercise_id)
  }

  pub fn contains(&self, exercise_id: &str) -> bool {
    self.by_id.contains_key(exercise_id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ExerciseDefinition> {
    self.by_id.values()
  }

  pub fn len(&self) -> usize { self.by_id.len() }

  pub fn is_empty(&self) -> bool { self.by_id.is_empty() }
}
