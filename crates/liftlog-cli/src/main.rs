//! liftlog command-line exerciser.
//!
//! Reads `liftlog.toml` (or the path specified with `--config`), opens the
//! active store — running the local→cloud migration pipeline exactly the way
//! the app would at launch — and exposes the workout log, favorites, and
//! settings from the terminal.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use liftlog_app::{FavoritesStore, SettingsStore};
use liftlog_core::{
  catalog::Catalog,
  model::{ExerciseSet, WeightUnit, Workout},
  store::LogStore,
};
use liftlog_sync::{
  account::{
    Availability, DEFAULT_PROBE_TIMEOUT, FixedAccount, probe,
  },
  defaults::FileDefaults,
  migrate::Migrator,
  provider::{StorePaths, open_active_store},
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "LiftLog workout log")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "liftlog.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Show the active store and migration state.
  Status,
  /// List all workouts with their sets.
  Workouts,
  /// Log a set for today's workout (created on first set of the day).
  Log {
    exercise_id: String,
    weight_kg:   f64,
    reps:        i32,
    #[arg(long)]
    rpe:         Option<f64>,
    #[arg(long)]
    duration:    Option<i32>,
  },
  /// List favorite exercises.
  Favorites,
  /// Flip an exercise's favorite status.
  Favorite { exercise_id: String },
  /// Show or change the preferred weight unit.
  Unit { unit: Option<WeightUnitArg> },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum WeightUnitArg {
  Kg,
  Lb,
}

impl From<WeightUnitArg> for WeightUnit {
  fn from(arg: WeightUnitArg) -> Self {
    match arg {
      WeightUnitArg::Kg => WeightUnit::Kg,
      WeightUnitArg::Lb => WeightUnit::Lb,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
struct AppConfig {
  #[serde(default = "default_data_dir")]
  data_dir:     PathBuf,
  /// Whether the cloud-synced store should be attempted at all.
  #[serde(default)]
  sync_enabled: bool,
  /// Optional JSON exercise catalog for display names.
  catalog_path: Option<PathBuf>,
  #[serde(default = "default_language")]
  language:     String,
}

fn default_data_dir() -> PathBuf { PathBuf::from("data") }

fn default_language() -> String { "en".to_owned() }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LIFTLOG"))
    .build()
    .context("failed to read config file")?;
  let cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise AppConfig")?;

  std::fs::create_dir_all(&cfg.data_dir)
    .with_context(|| format!("failed to create {:?}", cfg.data_dir))?;

  let defaults =
    Arc::new(FileDefaults::load(cfg.data_dir.join("defaults.json"))?);

  // Account availability gates the cloud store; without a platform account
  // service the signal is config-driven.
  let account = FixedAccount(if cfg.sync_enabled {
    Availability::Available
  } else {
    Availability::NoAccount
  });
  let availability = probe(&account, DEFAULT_PROBE_TIMEOUT).await;

  let paths = StorePaths::under(&cfg.data_dir);
  let active = open_active_store(&paths, availability)
    .await
    .context("no usable store")?;

  let migrator = Migrator::new(paths.local.clone());
  let migration = migrator.run(&active, defaults.as_ref()).await;

  let catalog = load_catalog(&cfg)?;

  match cli.command {
    Command::Status => {
      println!("store:       {:?}", active.kind);
      println!("account:     {availability:?}");
      println!("migration:   {migration:?}");
    }

    Command::Workouts => {
      let workouts = active.store.list_workouts().await?;
      if workouts.is_empty() {
        println!("no workouts logged");
      }
      for workout in workouts {
        println!(
          "{}  {}",
          workout.date.format("%Y-%m-%d"),
          workout.note.as_deref().unwrap_or("")
        );
        for set in &workout.sets {
          let name = display_name(&catalog, &cfg.language, &set.exercise_id);
          let rpe = set.rpe.map(|r| format!(" @{r:.1}")).unwrap_or_default();
          println!("  {name}: {:.1}kg x {}{rpe}", set.weight_kg, set.reps);
        }
      }
    }

    Command::Log { exercise_id, weight_kg, reps, rpe, duration } => {
      let mut set = ExerciseSet::new(exercise_id, weight_kg, reps);
      set.rpe = rpe;
      set.duration_seconds = duration;

      // One workout per calendar day: append to today's if it exists.
      let today = Utc::now().date_naive();
      let existing = active
        .store
        .list_workouts()
        .await?
        .into_iter()
        .find(|w| w.date.date_naive() == today);

      match existing {
        Some(workout) => {
          active.store.add_set(workout.workout_id, set).await?;
        }
        None => {
          let workout = Workout::new(Utc::now(), None, vec![set]);
          active.store.insert_workout(workout).await?;
        }
      }
      println!("logged");
    }

    Command::Favorites => {
      let mut favorites = FavoritesStore::new(defaults.clone());
      favorites.bind(&active.store).await;

      let mut ids: Vec<&String> = favorites.ids().iter().collect();
      ids.sort();
      if ids.is_empty() {
        println!("no favorites");
      }
      for id in ids {
        println!("{}", display_name(&catalog, &cfg.language, id));
      }
    }

    Command::Favorite { exercise_id } => {
      let mut favorites = FavoritesStore::new(defaults.clone());
      favorites.bind(&active.store).await;
      favorites.toggle(&exercise_id).await;
      let state = if favorites.is_favorite(&exercise_id) {
        "favorited"
      } else {
        "unfavorited"
      };
      println!("{state} {exercise_id}");
    }

    Command::Unit { unit } => {
      let mut settings_store = SettingsStore::new(defaults.clone());
      settings_store.bind(&active.store).await;
      if let Some(unit) = unit {
        settings_store.update_weight_unit(unit.into()).await;
      }
      println!("{}", settings_store.weight_unit().as_raw());
    }
  }

  Ok(())
}

fn load_catalog(cfg: &AppConfig) -> anyhow::Result<Catalog> {
  let Some(path) = &cfg.catalog_path else {
    return Ok(Catalog::default());
  };
  let json = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read catalog at {path:?}"))?;
  Catalog::from_json(&json).context("failed to parse catalog")
}

fn display_name<'a>(
  catalog: &'a Catalog,
  language: &str,
  exercise_id: &'a str,
) -> &'a str {
  catalog
    .get(exercise_id)
    .map(|def| def.name(language))
    .unwrap_or(exercise_id)
}
