//! Core types and trait definitions for the LiftLog workout store.
//!
//! This crate is deliberately free of database dependencies. The SQLite
//! backend, the sync/migration machinery, and the runtime caches all depend
//! on it; it depends on nothing but serde, chrono, and uuid.

pub mod catalog;
pub mod error;
pub mod flags;
pub mod model;
pub mod reconcile;
pub mod store;

pub use error::{Error, Result};
