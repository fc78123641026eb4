//! The `EntrySource` trait: where the store gets its entries from.
//!
//! Implemented by the remote sheet client in `gratitude-store`. The store
//! depends on this abstraction rather than on any concrete transport, so
//! tests can substitute an in-process source.

use std::future::Future;

use crate::Entry;

/// A remote (or fake) origin of the full entry list.
///
/// Every call returns the complete list in source order; there is no
/// incremental fetch.
pub trait EntrySource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch every entry.
  fn fetch(&self) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;
}
