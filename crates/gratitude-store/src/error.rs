//! Error types for `gratitude-store`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No refresh has succeeded yet.
  #[error("entries have not been loaded yet")]
  NotLoaded,

  #[error("fetch failed: {0}")]
  Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("gave up loading entries after {attempts} attempts: {last}")]
  Exhausted { attempts: u32, last: String },

  #[error("timed out after {0:?} waiting for entries to load")]
  Timeout(Duration),
}

/// Failure talking to the remote sheet endpoint.
#[derive(Debug, Error)]
pub enum SheetError {
  /// Transport or body decoding failure.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unexpected status {0}")]
  Status(reqwest::StatusCode),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
