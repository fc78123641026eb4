//! JSON REST API for the gratitude statistics service.
//!
//! Exposes axum [`Router`]s backed by an [`EntryStore`] over any
//! [`EntrySource`], plus the unrelated demo cat resource. CORS, logging and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = gratitude_api::api_router(store, RetryPolicy::default(), cats);
//! ```

pub mod cats;
pub mod error;
pub mod gratitude;

use std::sync::Arc;

use axum::{Router, routing::get};
use gratitude_core::source::EntrySource;
use gratitude_store::{EntryStore, RetryPolicy};

pub use cats::{CatRegistry, cats_router};
pub use error::ApiError;
pub use gratitude::GratitudeState;

/// Build the `/gratitude` router for `store`.
///
/// Handlers load the store on demand according to `retry` and answer 503
/// when it cannot be loaded.
pub fn gratitude_router<S>(store: Arc<EntryStore<S>>, retry: RetryPolicy) -> Router<()>
where
  S: EntrySource + 'static,
{
  Router::new()
    .route("/gratitude", get(gratitude::entries::<S>))
    .route("/gratitude/top-people", get(gratitude::top_people::<S>))
    .route("/gratitude/good-habits", get(gratitude::good_habits::<S>))
    .route("/gratitude/bad-habits", get(gratitude::bad_habits::<S>))
    .route("/gratitude/kpi-dashboard", get(gratitude::dashboard::<S>))
    .with_state(GratitudeState { store, retry })
}

/// The gratitude endpoints merged with the demo cat resource.
pub fn api_router<S>(
  store: Arc<EntryStore<S>>,
  retry: RetryPolicy,
  cats: Arc<CatRegistry>,
) -> Router<()>
where
  S: EntrySource + 'static,
{
  Router::new()
    .merge(gratitude_router(store, retry))
    .merge(cats_router(cats))
}

// ─── Integration tests ────────────────────────────────────────────────────────
