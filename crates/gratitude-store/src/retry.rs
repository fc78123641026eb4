//! Bounded load-on-demand for the entry store.

use std::{
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use gratitude_core::source::EntrySource;
use tokio::sync::Mutex;

use crate::{EntryStore, Error, Result, Snapshot};

/// How hard [`EntryStore::ensure_loaded`] tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Maximum refresh attempts; `0` is treated as `1`.
  pub attempts:        u32,
  /// Sleep after the first failure. Doubles after each further failure.
  pub initial_backoff: Duration,
  pub max_backoff:     Duration,
  /// Upper bound on the whole wait, sleeps included.
  pub timeout:         Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      attempts:        5,
      initial_backoff: Duration::from_millis(250),
      max_backoff:     Duration::from_secs(5),
      timeout:         Duration::from_secs(60),
    }
  }
}

impl RetryPolicy {
  /// Backoff to sleep after failed attempt number `attempt` (1-based).
  pub fn backoff(&self, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    self
      .initial_backoff
      .saturating_mul(factor)
      .min(self.max_backoff)
  }
}

/// Serialises cold loads so concurrent callers share one retry loop.
///
/// `failures` only moves while `last_failure` is held. A caller that saw it
/// move while waiting adopts that failure instead of starting its own loop.
#[derive(Debug, Default)]
pub(crate) struct LoadGate {
  failures:     AtomicU64,
  last_failure: Mutex<Option<String>>,
}

impl<S: EntrySource> EntryStore<S> {
  /// Return the loaded snapshot, refreshing first if nothing is loaded yet.
  ///
  /// Refreshes are retried with exponential backoff up to
  /// `policy.attempts` times and the whole wait is bounded by
  /// `policy.timeout`. Concurrent callers wait for a single loader and share
  /// its outcome.
  pub async fn ensure_loaded(&self, policy: &RetryPolicy) -> Result<Arc<Snapshot>> {
    if let Ok(snapshot) = self.snapshot().await {
      return Ok(snapshot);
    }

    match tokio::time::timeout(policy.timeout, self.load_once(policy)).await {
      Ok(res) => res,
      Err(_) => {
        tracing::error!(timeout = ?policy.timeout, "timed out loading entries");
        Err(Error::Timeout(policy.timeout))
      }
    }
  }

  async fn load_once(&self, policy: &RetryPolicy) -> Result<Arc<Snapshot>> {
    let gate = &self.load_gate;
    let seen = gate.failures.load(Ordering::SeqCst);
    let mut last_failure = gate.last_failure.lock().await;

    if let Ok(snapshot) = self.snapshot().await {
      return Ok(snapshot);
    }
    if gate.failures.load(Ordering::SeqCst) != seen {
      return Err(Error::Exhausted {
        attempts: policy.attempts.max(1),
        last:     last_failure.clone().unwrap_or_default(),
      });
    }

    let res = self.load_with_retries(policy).await;
    if let Err(Error::Exhausted { last, .. }) = &res {
      *last_failure = Some(last.clone());
      gate.failures.fetch_add(1, Ordering::SeqCst);
    }
    res
  }

  async fn load_with_retries(&self, policy: &RetryPolicy) -> Result<Arc<Snapshot>> {
    let attempts = policy.attempts.max(1);
    let mut last = String::new();

    for attempt in 1..=attempts {
      match self.refresh().await {
        Ok(_) => return self.snapshot().await,
        Err(e) => {
          // Another request may have loaded the store in the meantime.
          if let Ok(snapshot) = self.snapshot().await {
            return Ok(snapshot);
          }
          last = e.to_string();
          if attempt < attempts {
            let wait = policy.backoff(attempt);
            tracing::info!(attempt, ?wait, "waiting for entries to load");
            tokio::time::sleep(wait).await;
          }
        }
      }
    }

    tracing::error!(attempts, error = %last, "giving up loading entries");
    Err(Error::Exhausted { attempts, last })
  }
}
