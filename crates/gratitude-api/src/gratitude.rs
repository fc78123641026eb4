//! Handlers for `/gratitude` endpoints.
//!
//! | Method | Path | Response key |
//! |--------|------|--------------|
//! | `GET`  | `/gratitude` | `gratitude` |
//! | `GET`  | `/gratitude/top-people` | `people` (optional `?limit`, default 10) |
//! | `GET`  | `/gratitude/good-habits` | `good_habits` |
//! | `GET`  | `/gratitude/bad-habits` | `bad_habits` |
//! | `GET`  | `/gratitude/kpi-dashboard` | `statistics` + `chart` |
//!
//! Every endpoint accepts `startDate` and `endDate` (inclusive, `YYYY-MM-DD`)
//! or a single `date`, which wins over the range. Empty values are ignored;
//! malformed ones (including a malformed `limit`) are rejected with a JSON 400.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use gratitude_core::{
  DateRange, Entry, FrequencyEntry,
  aggregate::{self, DEFAULT_LIMIT},
  entry::parse_date,
  source::EntrySource,
};
use gratitude_store::{EntryStore, RetryPolicy, Snapshot};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state for the gratitude handlers.
pub struct GratitudeState<S> {
  pub store: Arc<EntryStore<S>>,
  pub retry: RetryPolicy,
}

impl<S> Clone for GratitudeState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      retry: self.retry,
    }
  }
}

/// The loaded snapshot, loading it first if needed.
async fn load<S: EntrySource>(
  state: &GratitudeState<S>,
) -> Result<Arc<Snapshot>, ApiError> {
  Ok(state.store.ensure_loaded(&state.retry).await?)
}

// ─── Query parameters ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
  pub start_date: Option<String>,
  pub end_date:   Option<String>,
  /// Single-day shorthand; used as both bounds.
  pub date:       Option<String>,
  /// Row cap for bounded rankings.
  #[serde(default, deserialize_with = "de_limit")]
  pub limit:      Option<usize>,
}

fn de_limit<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => s.parse().map(Some).map_err(|e| {
      serde::de::Error::custom(format!("invalid limit: {s:?}: {e}"))
    }),
  }
}

/// The parsed query string; a rejection becomes a JSON 400.
fn query(
  params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<RangeParams, ApiError> {
  match params {
    Ok(Query(params)) => Ok(params),
    Err(rejection) => {
      tracing::debug!(%rejection, "rejected query string");
      Err(ApiError::BadRequest(rejection.body_text()))
    }
  }
}

impl RangeParams {
  pub fn range(&self) -> Result<DateRange, ApiError> {
    if let Some(day) = param_date("date", self.date.as_deref())? {
      return Ok(DateRange::day(day));
    }
    Ok(DateRange::new(
      param_date("startDate", self.start_date.as_deref())?,
      param_date("endDate", self.end_date.as_deref())?,
    ))
  }

  pub fn limit(&self) -> usize { self.limit.unwrap_or(DEFAULT_LIMIT) }
}

fn param_date(
  name: &str,
  raw: Option<&str>,
) -> Result<Option<chrono::NaiveDate>, ApiError> {
  match raw.map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => parse_date(s)
      .map(Some)
      .map_err(|_| ApiError::BadRequest(format!("invalid {name}: {s:?}"))),
  }
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct GratitudeResponse {
  pub gratitude: Vec<Entry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeopleResponse {
  pub people: Vec<FrequencyEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoodHabitsResponse {
  pub good_habits: Vec<FrequencyEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BadHabitsResponse {
  pub bad_habits: Vec<FrequencyEntry>,
}

/// Scalar KPIs for the dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct Statistics {
  /// Entries in the requested range.
  pub entries:         usize,
  /// Entries in the whole snapshot.
  pub total_entries:   usize,
  pub grateful_things: usize,
  pub mistakes:        usize,
  pub unique_people:   usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Chart {
  pub top_people:            Vec<FrequencyEntry>,
  pub most_grateful_days:    Vec<FrequencyEntry>,
  pub most_regrettable_days: Vec<FrequencyEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
  pub statistics: Statistics,
  pub chart:      Chart,
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /gratitude[?startDate=..&endDate=..|?date=..]`
pub async fn entries<S: EntrySource>(
  State(state): State<GratitudeState<S>>,
  params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<GratitudeResponse>, ApiError> {
  let params = query(params)?;
  let range = params.range()?;
  let snapshot = load(&state).await?;
  let gratitude: Vec<Entry> =
    snapshot.in_range(&range).into_iter().cloned().collect();
  tracing::debug!(?range, count = gratitude.len(), "listing entries");
  Ok(Json(GratitudeResponse { gratitude }))
}

/// `GET /gratitude/top-people[?limit=n]`
pub async fn top_people<S: EntrySource>(
  State(state): State<GratitudeState<S>>,
  params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<PeopleResponse>, ApiError> {
  let params = query(params)?;
  let range = params.range()?;
  let snapshot = load(&state).await?;
  let filtered = snapshot.in_range(&range);
  Ok(Json(PeopleResponse {
    people: aggregate::top_people(filtered.iter().copied(), params.limit()),
  }))
}

/// `GET /gratitude/good-habits`
pub async fn good_habits<S: EntrySource>(
  State(state): State<GratitudeState<S>>,
  params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<GoodHabitsResponse>, ApiError> {
  let params = query(params)?;
  let range = params.range()?;
  let snapshot = load(&state).await?;
  let filtered = snapshot.in_range(&range);
  Ok(Json(GoodHabitsResponse {
    good_habits: aggregate::good_habits(filtered.iter().copied()),
  }))
}

/// `GET /gratitude/bad-habits`
pub async fn bad_habits<S: EntrySource>(
  State(state): State<GratitudeState<S>>,
  params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<BadHabitsResponse>, ApiError> {
  let params = query(params)?;
  let range = params.range()?;
  let snapshot = load(&state).await?;
  let filtered = snapshot.in_range(&range);
  Ok(Json(BadHabitsResponse {
    bad_habits: aggregate::bad_habits(filtered.iter().copied()),
  }))
}

/// `GET /gratitude/kpi-dashboard`
pub async fn dashboard<S: EntrySource>(
  State(state): State<GratitudeState<S>>,
  params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<DashboardResponse>, ApiError> {
  let params = query(params)?;
  let range = params.range()?;
  let limit = params.limit();
  let snapshot = load(&state).await?;
  let filtered = snapshot.in_range(&range);
  let it = || filtered.iter().copied();

  let statistics = Statistics {
    entries:         aggregate::count_entries(it()),
    total_entries:   snapshot.len(),
    grateful_things: aggregate::total_grateful_things(it()),
    mistakes:        aggregate::total_mistakes(it()),
    unique_people:   aggregate::count_unique_people(it()),
  };
  let chart = Chart {
    top_people:            aggregate::top_people(it(), limit),
    most_grateful_days:    aggregate::most_grateful_days(it(), limit),
    most_regrettable_days: aggregate::most_regrettable_days(it(), limit),
  };
  Ok(Json(DashboardResponse { statistics, chart }))
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn params(start: Option<&str>, end: Option<&str>, date: Option<&str>) -> RangeParams {
    RangeParams {
      start_date: start.map(str::to_owned),
      end_date:   end.map(str::to_owned),
      date:       date.map(str::to_owned),
      limit:      None,
    }
  }

  fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
  }

  #[test]
  fn absent_and_empty_params_are_unbounded() {
    assert!(params(None, None, None).range().unwrap().is_unbounded());
    assert!(params(Some(""), Some(" "), Some("")).range().unwrap().is_unbounded());
  }

  #[test]
  fn single_date_wins_over_range() {
    let range = params(Some("2024-01-01"), Some("2024-01-31"), Some("2024-01-05"))
      .range()
      .unwrap();
    assert_eq!(range, DateRange::day(d(5)));
  }

  #[test]
  fn malformed_date_is_rejected() {
    let err = params(Some("last week"), None, None).range().unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(ref m) if m.contains("startDate")));
  }

  #[test]
  fn limit_defaults_to_ten() {
    assert_eq!(RangeParams::default().limit(), 10);
  }
}
