//! In-memory entry store for the gratitude service.
//!
//! Holds the last successful fetch from an [`EntrySource`] as an immutable
//! snapshot that is swapped wholesale on refresh. [`SheetSource`] is the
//! HTTP-backed source used in production.
//!
//! [`EntrySource`]: gratitude_core::source::EntrySource

mod retry;
mod sheet;
mod store;

pub mod error;

pub use error::{Error, Result, SheetError};
pub use retry::RetryPolicy;
pub use sheet::SheetSource;
pub use store::{EntryStore, Snapshot};

#[cfg(test)]
mod tests;
