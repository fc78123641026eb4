//! Tests for `EntryStore` against scripted in-process sources, and for
//! `SheetSource` against a mock HTTP server.

use std::{
  collections::VecDeque,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use chrono::NaiveDate;
use gratitude_core::{DateRange, Entry, source::EntrySource};
use serde_json::json;

use crate::{EntryStore, Error, RetryPolicy, SheetError, SheetSource};

// ─── Scripted source ─────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("upstream unavailable")]
struct Down;

/// Replays queued results in order; fails once the script runs out.
#[derive(Default)]
struct Scripted {
  script: Mutex<VecDeque<Result<Vec<Entry>, Down>>>,
  calls:  AtomicUsize,
  delay:  Option<Duration>,
}

impl Scripted {
  fn new(script: Vec<Result<Vec<Entry>, Down>>) -> Self {
    Self {
      script: Mutex::new(script.into()),
      ..Self::default()
    }
  }

  fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl EntrySource for Scripted {
  type Error = Down;

  async fn fetch(&self) -> Result<Vec<Entry>, Down> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    self.script.lock().unwrap().pop_front().unwrap_or(Err(Down))
  }
}

fn d(day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn days(days: &[u32]) -> Vec<Entry> {
  days.iter().map(|&n| Entry::on(d(n))).collect()
}

fn quick_policy(attempts: u32) -> RetryPolicy {
  RetryPolicy {
    attempts,
    initial_backoff: Duration::from_millis(1),
    max_backoff: Duration::from_millis(2),
    timeout: Duration::from_secs(5),
  }
}

// ─── Load state ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_store_is_not_loaded() {
  let store = EntryStore::new(Scripted::default());
  assert!(!store.is_loaded().await);
  assert!(matches!(
    store.entries_in_range(DateRange::all()).await,
    Err(Error::NotLoaded)
  ));
  assert!(matches!(store.count_all().await, Err(Error::NotLoaded)));
}

#[tokio::test]
async fn refresh_loads_entries() {
  let store = EntryStore::new(Scripted::new(vec![Ok(days(&[1, 2, 3]))]));
  assert_eq!(store.refresh().await.unwrap(), 3);
  assert!(store.is_loaded().await);
  assert_eq!(store.count_all().await.unwrap(), 3);
}

#[tokio::test]
async fn failed_first_refresh_stays_unloaded() {
  let store = EntryStore::new(Scripted::new(vec![Err(Down)]));
  assert!(matches!(store.refresh().await, Err(Error::Fetch(_))));
  assert!(!store.is_loaded().await);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
  let store =
    EntryStore::new(Scripted::new(vec![Ok(days(&[1, 2])), Err(Down)]));
  store.refresh().await.unwrap();
  let before = store.snapshot().await.unwrap();

  assert!(store.refresh().await.is_err());
  assert!(store.is_loaded().await);
  let after = store.snapshot().await.unwrap();
  assert_eq!(after.entries(), before.entries());
  assert_eq!(after.fetched_at(), before.fetched_at());
}

#[tokio::test]
async fn refresh_replaces_the_whole_list() {
  let store =
    EntryStore::new(Scripted::new(vec![Ok(days(&[1, 2, 3])), Ok(days(&[9]))]));
  store.refresh().await.unwrap();
  let old = store.snapshot().await.unwrap();

  store.refresh().await.unwrap();
  assert_eq!(store.count_all().await.unwrap(), 1);
  // Readers holding the old snapshot are unaffected.
  assert_eq!(old.len(), 3);
}

// ─── Range filter ────────────────────────────────────────────────────────────

#[tokio::test]
async fn range_is_inclusive_and_ordered() {
  let store = EntryStore::new(Scripted::new(vec![Ok(days(&[1, 2, 3, 4]))]));
  store.refresh().await.unwrap();

  let got = store
    .entries_in_range(DateRange::new(Some(d(2)), Some(d(3))))
    .await
    .unwrap();
  let dates: Vec<_> = got.iter().map(|e| e.date).collect();
  assert_eq!(dates, vec![d(2), d(3)]);
}

#[tokio::test]
async fn unbounded_range_is_identity() {
  let entries = days(&[3, 1, 2, 1]);
  let store = EntryStore::new(Scripted::new(vec![Ok(entries.clone())]));
  store.refresh().await.unwrap();

  assert_eq!(store.entries_in_range(DateRange::all()).await.unwrap(), entries);
}

#[tokio::test]
async fn single_day_range_keeps_duplicates() {
  let store = EntryStore::new(Scripted::new(vec![Ok(days(&[1, 2, 2, 3]))]));
  store.refresh().await.unwrap();

  let snapshot = store.snapshot().await.unwrap();
  assert_eq!(snapshot.in_range(&DateRange::day(d(2))).len(), 2);
}

// ─── ensure_loaded ───────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_loaded_returns_existing_snapshot_without_fetching() {
  let store = EntryStore::new(Scripted::new(vec![Ok(days(&[1]))]));
  store.refresh().await.unwrap();

  let snapshot = store.ensure_loaded(&quick_policy(3)).await.unwrap();
  assert_eq!(snapshot.len(), 1);
  assert_eq!(store.source_calls(), 1);
}

#[tokio::test]
async fn ensure_loaded_retries_until_success() {
  let store = EntryStore::new(Scripted::new(vec![
    Err(Down),
    Err(Down),
    Ok(days(&[1, 2])),
  ]));

  let snapshot = store.ensure_loaded(&quick_policy(5)).await.unwrap();
  assert_eq!(snapshot.len(), 2);
  assert_eq!(store.source_calls(), 3);
}

#[tokio::test]
async fn ensure_loaded_gives_up_after_attempts() {
  let store = EntryStore::new(Scripted::default());

  match store.ensure_loaded(&quick_policy(3)).await {
    Err(Error::Exhausted { attempts, last }) => {
      assert_eq!(attempts, 3);
      assert!(last.contains("upstream unavailable"), "{last}");
    }
    other => panic!("expected Exhausted, got {other:?}"),
  }
  assert_eq!(store.source_calls(), 3);
  assert!(!store.is_loaded().await);
}

#[tokio::test]
async fn ensure_loaded_times_out_on_a_hanging_source() {
  let source = Scripted {
    delay: Some(Duration::from_secs(30)),
    ..Scripted::new(vec![Ok(days(&[1]))])
  };
  let store = EntryStore::new(source);
  let policy = RetryPolicy {
    timeout: Duration::from_millis(20),
    ..quick_policy(3)
  };

  assert!(matches!(
    store.ensure_loaded(&policy).await,
    Err(Error::Timeout(_))
  ));
}

#[tokio::test]
async fn concurrent_cold_loads_share_one_failing_loop() {
  let source = Scripted {
    delay: Some(Duration::from_millis(5)),
    ..Scripted::default()
  };
  let store = Arc::new(EntryStore::new(source));
  let policy = quick_policy(3);

  let (first, second, third, fourth) = tokio::join!(
    store.ensure_loaded(&policy),
    store.ensure_loaded(&policy),
    store.ensure_loaded(&policy),
    store.ensure_loaded(&policy),
  );

  for res in [first, second, third, fourth] {
    match res {
      Err(Error::Exhausted { attempts, last }) => {
        assert_eq!(attempts, 3);
        assert!(last.contains("upstream unavailable"), "{last}");
      }
      other => panic!("expected Exhausted, got {other:?}"),
    }
  }
  assert_eq!(store.source_calls(), 3);
}

#[tokio::test]
async fn concurrent_cold_loads_fetch_once_on_success() {
  let source = Scripted {
    delay: Some(Duration::from_millis(5)),
    ..Scripted::new(vec![Ok(days(&[1, 2]))])
  };
  let store = Arc::new(EntryStore::new(source));
  let policy = quick_policy(3);

  let (first, second, third) = tokio::join!(
    store.ensure_loaded(&policy),
    store.ensure_loaded(&policy),
    store.ensure_loaded(&policy),
  );

  for res in [first, second, third] {
    assert_eq!(res.unwrap().len(), 2);
  }
  assert_eq!(store.source_calls(), 1);
}

#[tokio::test]
async fn a_later_cold_load_retries_after_a_shared_failure() {
  let store =
    EntryStore::new(Scripted::new(vec![Err(Down), Ok(days(&[1]))]));

  assert!(store.ensure_loaded(&quick_policy(1)).await.is_err());
  assert_eq!(store.ensure_loaded(&quick_policy(1)).await.unwrap().len(), 1);
  assert_eq!(store.source_calls(), 2);
}

impl EntryStore<Scripted> {
  fn source_calls(&self) -> usize { self.source().calls() }
}

// ─── SheetSource ─────────────────────────────────────────────────────────────

async fn sheet(server: &mockito::ServerGuard) -> SheetSource {
  SheetSource::new(format!("{}/exec", server.url()), Duration::from_secs(5))
    .unwrap()
}

#[tokio::test]
async fn sheet_source_decodes_envelope() {
  let mut server = mockito::Server::new_async().await;
  let mock = server
    .mock("GET", "/exec")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(
      json!({
        "data": [
          {
            "date": "2024-01-02T05:00:00.000Z",
            "story": "a walk",
            "learned": "",
            "grateful": ["sun", "tea"],
            "mistake": [],
            "people": ["Ana"],
            "good_habit": ["run"],
            "bad_habit": []
          },
          { "date": "2024-01-03" }
        ]
      })
      .to_string(),
    )
    .create_async()
    .await;

  let entries = sheet(&server).await.fetch().await.unwrap();
  mock.assert_async().await;

  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0].date, d(2));
  assert_eq!(entries[0].grateful, vec!["sun", "tea"]);
  assert_eq!(entries[1].date, d(3));
  assert!(entries[1].people.is_empty());
}

#[tokio::test]
async fn sheet_source_treats_missing_data_as_empty() {
  let mut server = mockito::Server::new_async().await;
  let _mock = server
    .mock("GET", "/exec")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body("{}")
    .create_async()
    .await;

  assert!(sheet(&server).await.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn sheet_source_rejects_error_status() {
  let mut server = mockito::Server::new_async().await;
  let _mock = server
    .mock("GET", "/exec")
    .with_status(502)
    .create_async()
    .await;

  match sheet(&server).await.fetch().await {
    Err(SheetError::Status(status)) => assert_eq!(status.as_u16(), 502),
    other => panic!("expected Status, got {other:?}"),
  }
}

#[tokio::test]
async fn sheet_source_rejects_malformed_body() {
  let mut server = mockito::Server::new_async().await;
  let _mock = server
    .mock("GET", "/exec")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"{"data": [{"date": "2024-01-01"}"#)
    .create_async()
    .await;

  assert!(matches!(
    sheet(&server).await.fetch().await,
    Err(SheetError::Http(_))
  ));
}

#[tokio::test]
async fn sheet_source_skips_rows_without_a_date() {
  let mut server = mockito::Server::new_async().await;
  let _mock = server
    .mock("GET", "/exec")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(
      json!({
        "data": [
          { "date": "2024-01-01", "people": ["Ana"] },
          { "people": ["Ben"] },
          { "date": "2024-01-03", "people": ["Cy"] }
        ]
      })
      .to_string(),
    )
    .create_async()
    .await;

  let entries = sheet(&server).await.fetch().await.unwrap();
  let dates: Vec<_> = entries.iter().map(|e| e.date).collect();
  assert_eq!(dates, vec![d(1), d(3)]);
  assert_eq!(entries[0].people, vec!["Ana"]);
}

#[tokio::test]
async fn sheet_source_skips_rows_with_blank_or_bad_dates() {
  let mut server = mockito::Server::new_async().await;
  let _mock = server
    .mock("GET", "/exec")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(
      json!({
        "data": [
          { "date": "2024-01-01", "people": ["Ana"] },
          { "date": "", "people": ["Ben"] },
          { "date": "someday" },
          null
        ]
      })
      .to_string(),
    )
    .create_async()
    .await;

  let store = EntryStore::new(sheet(&server).await);
  assert_eq!(store.refresh().await.unwrap(), 1);
  assert!(store.is_loaded().await);
  let entries = store.entries_in_range(DateRange::all()).await.unwrap();
  assert_eq!(entries[0].people, vec!["Ana"]);
}

#[tokio::test]
async fn store_over_sheet_source_survives_upstream_failure() {
  let mut server = mockito::Server::new_async().await;
  let healthy = server
    .mock("GET", "/exec")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"{"data": [{"date": "2024-01-01"}]}"#)
    .create_async()
    .await;

  let store = EntryStore::new(sheet(&server).await);
  store.refresh().await.unwrap();
  healthy.assert_async().await;

  server.reset();
  let _failing = server
    .mock("GET", "/exec")
    .with_status(500)
    .create_async()
    .await;

  assert!(store.refresh().await.is_err());
  assert_eq!(store.count_all().await.unwrap(), 1);
}
