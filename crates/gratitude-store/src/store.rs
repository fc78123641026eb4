use std::sync::Arc;

use chrono::{DateTime, Utc};
use gratitude_core::{DateRange, Entry, source::EntrySource};
use tokio::sync::RwLock;

use crate::{Error, Result, retry::LoadGate};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One successful fetch, frozen. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct Snapshot {
  entries:    Vec<Entry>,
  fetched_at: DateTime<Utc>,
}

impl Snapshot {
  pub fn new(entries: Vec<Entry>) -> Self {
    Self {
      entries,
      fetched_at: Utc::now(),
    }
  }

  /// All entries in fetch order.
  pub fn entries(&self) -> &[Entry] { &self.entries }

  pub fn fetched_at(&self) -> DateTime<Utc> { self.fetched_at }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Entries whose date lies in `range`, in fetch order.
  pub fn in_range(&self, range: &DateRange) -> Vec<&Entry> {
    if range.is_unbounded() {
      return self.entries.iter().collect();
    }
    self
      .entries
      .iter()
      .filter(|e| range.contains(e.date))
      .collect()
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The canonical in-memory snapshot of entries, plus the source it is
/// refreshed from.
///
/// Readers clone the current `Arc<Snapshot>` and work on it without holding
/// the lock, so a concurrent refresh is observed either entirely or not at
/// all.
pub struct EntryStore<S> {
  source:               S,
  snapshot:             RwLock<Option<Arc<Snapshot>>>,
  pub(crate) load_gate: LoadGate,
}

impl<S: EntrySource> EntryStore<S> {
  /// A store in the "not loaded" state.
  pub fn new(source: S) -> Self {
    Self {
      source,
      snapshot: RwLock::new(None),
      load_gate: LoadGate::default(),
    }
  }

  pub fn source(&self) -> &S { &self.source }

  /// Fetch the full list and replace the snapshot.
  ///
  /// On failure the previous snapshot (or the unloaded state) is kept and the
  /// error is returned. Returns the number of entries loaded.
  pub async fn refresh(&self) -> Result<usize> {
    let entries = match self.source.fetch().await {
      Ok(entries) => entries,
      Err(e) => {
        tracing::warn!(error = %e, "failed to fetch entries");
        return Err(Error::Fetch(Box::new(e)));
      }
    };

    let count = entries.len();
    let fresh = Arc::new(Snapshot::new(entries));
    *self.snapshot.write().await = Some(fresh);
    tracing::info!(count, "loaded entries");
    Ok(count)
  }

  /// Whether any refresh has ever succeeded.
  pub async fn is_loaded(&self) -> bool { self.snapshot.read().await.is_some() }

  /// The current snapshot, or [`Error::NotLoaded`].
  pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
    self.snapshot.read().await.clone().ok_or(Error::NotLoaded)
  }

  /// Owned copies of the entries within `range`, in fetch order.
  pub async fn entries_in_range(&self, range: DateRange) -> Result<Vec<Entry>> {
    let snapshot = self.snapshot().await?;
    Ok(snapshot.in_range(&range).into_iter().cloned().collect())
  }

  /// Total entries in the current snapshot.
  pub async fn count_all(&self) -> Result<usize> {
    Ok(self.snapshot().await?.len())
  }
}
