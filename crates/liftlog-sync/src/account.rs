//! Cloud-account availability, probed under a timeout.
//!
//! The platform answer can be slow or never arrive; startup must not hang on
//! it. [`probe`] bounds the lookup with `tokio::time::timeout` and treats an
//! elapsed deadline as [`Availability::Unknown`], which bypasses the cloud
//! store entirely.

use std::{future::Future, time::Duration};

use tracing::warn;

/// The default deadline for one availability lookup.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// The platform's answer about the sync account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
  Available,
  NoAccount,
  Restricted,
  Unknown,
}

impl Availability {
  /// Only a definitive "available" gates the cloud store attempt.
  pub fn allows_cloud(self) -> bool { matches!(self, Self::Available) }
}

/// Source of the account-availability signal.
pub trait AccountStatus: Send + Sync {
  fn availability(
    &self,
  ) -> impl Future<Output = Availability> + Send + '_;
}

/// A fixed, configuration-driven answer — used where no platform account
/// service exists (tests, headless deployments, sync disabled by config).
#[derive(Debug, Clone, Copy)]
pub struct FixedAccount(pub Availability);

impl AccountStatus for FixedAccount {
  async fn availability(&self) -> Availability { self.0 }
}

/// Ask `account` for its availability, giving up after `timeout`.
pub async fn probe<A: AccountStatus>(
  account: &A,
  timeout: Duration,
) -> Availability {
  match tokio::time::timeout(timeout, account.availability()).await {
    Ok(availability) => availability,
    Err(_) => {
      warn!(?timeout, "account availability lookup timed out");
      Availability::Unknown
    }
  }
}
