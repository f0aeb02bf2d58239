//! Store selection and local→cloud migration for LiftLog.
//!
//! This crate owns everything between "the app wants a store" and "the app
//! has one": probing cloud-account availability under a timeout, opening the
//! cloud-synced or local-only SQLite store with an explicit fallback policy,
//! and running the one-time, idempotent migration of a legacy local store
//! into the active cloud store.
//!
//! Migration failures never propagate to callers — the app stays fully
//! usable on whichever store it has, and an unset flag means the next launch
//! retries.

pub mod account;
pub mod defaults;
pub mod error;
pub mod migrate;
pub mod provider;

pub use error::{Error, Result};
