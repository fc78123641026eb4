//! HTTP server wiring for the gratitude statistics service.
//!
//! Combines the API routers with CORS and request logging, loads
//! [`ServerConfig`], and keeps the entry store warm in the background.

pub mod logging;

use std::{path::Path, sync::Arc, time::Duration};

use axum::{Router, middleware};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use gratitude_api::CatRegistry;
use gratitude_core::source::EntrySource;
use gratitude_store::{EntryStore, RetryPolicy};
use serde::Deserialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tower_http::cors::CorsLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `GRATITUDE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                     String,
  pub port:                     u16,
  /// Sheet endpoint returning `{ "data": [Entry] }`.
  pub source_url:               String,
  pub fetch_timeout_secs:       u64,
  pub retry_attempts:           u32,
  pub retry_initial_backoff_ms: u64,
  pub retry_max_backoff_ms:     u64,
  /// Upper bound on how long a request waits for the first load.
  pub load_timeout_secs:        u64,
  /// Periodic background refresh; disabled when unset.
  pub refresh_interval_secs:    Option<u64>,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
  Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 3000_i64)?
    .set_default("fetch_timeout_secs", 30_i64)?
    .set_default("retry_attempts", 5_i64)?
    .set_default("retry_initial_backoff_ms", 250_i64)?
    .set_default("retry_max_backoff_ms", 5000_i64)?
    .set_default("load_timeout_secs", 60_i64)
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment over the defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    defaults()?
      .add_source(File::from(path).required(false))
      .add_source(Environment::with_prefix("GRATITUDE"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn fetch_timeout(&self) -> Duration { Duration::from_secs(self.fetch_timeout_secs) }

  pub fn refresh_interval(&self) -> Option<Duration> {
    self
      .refresh_interval_secs
      .filter(|&secs| secs > 0)
      .map(Duration::from_secs)
  }

  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy {
      attempts:        self.retry_attempts,
      initial_backoff: Duration::from_millis(self.retry_initial_backoff_ms),
      max_backoff:     Duration::from_millis(self.retry_max_backoff_ms),
      timeout:         Duration::from_secs(self.load_timeout_secs),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: API routes, request logging and
/// permissive CORS.
pub fn router<S>(
  store: Arc<EntryStore<S>>,
  retry: RetryPolicy,
  cats: Arc<CatRegistry>,
) -> Router
where
  S: EntrySource + 'static,
{
  gratitude_api::api_router(store, retry, cats)
    .layer(middleware::from_fn(logging::log_requests))
    .layer(CorsLayer::permissive())
}

// ─── Background refresh ──────────────────────────────────────────────────────

/// Warm the store once, then refresh it every `every` if set.
///
/// Failures leave the previous snapshot in place; the store logs them.
pub fn spawn_refresher<S>(
  store: Arc<EntryStore<S>>,
  every: Option<Duration>,
) -> JoinHandle<()>
where
  S: EntrySource + 'static,
{
  tokio::spawn(async move {
    if store.refresh().await.is_err() {
      tracing::info!("initial load failed; requests will retry on demand");
    }
    let Some(every) = every else { return };

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
      ticker.tick().await;
      if store.refresh().await.is_err() {
        tracing::debug!("periodic refresh failed; keeping previous entries");
      }
    }
  })
}

// ─── Integration tests ────────────────────────────────────────────────────────
