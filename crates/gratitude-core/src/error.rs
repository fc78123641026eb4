//! Error types for `gratitude-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date: {0:?}")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
