//! HTTP client for the spreadsheet-backed entry endpoint.

use std::time::Duration;

use gratitude_core::{Entry, source::EntrySource};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::SheetError;

/// Response body of the sheet endpoint: `{ "data": [Entry] }`.
///
/// Rows are kept as raw JSON so one bad row cannot fail the whole body.
#[derive(Debug, Deserialize)]
struct Envelope {
  #[serde(default)]
  data: Option<Vec<Value>>,
}

/// Decode every row that has a usable date. Rows without one (blank
/// trailing spreadsheet rows, typically) are dropped and logged.
fn decode_rows(rows: Vec<Value>) -> Vec<Entry> {
  let total = rows.len();
  let mut entries = Vec::with_capacity(total);
  let mut first_error = None;

  for row in rows {
    match serde_json::from_value::<Entry>(row) {
      Ok(entry) => entries.push(entry),
      Err(e) if first_error.is_none() => first_error = Some(e),
      Err(_) => {}
    }
  }

  if let Some(error) = first_error {
    tracing::warn!(
      skipped = total - entries.len(),
      total,
      %error,
      "skipped rows without a usable date"
    );
  }
  entries
}

/// [`EntrySource`] that issues `GET <url>` against the sheet endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct SheetSource {
  client: Client,
  url:    String,
}

impl SheetSource {
  /// Build a source for `url` whose requests give up after `timeout`.
  pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SheetError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      url: url.into(),
    })
  }

  pub fn url(&self) -> &str { &self.url }
}

impl EntrySource for SheetSource {
  type Error = SheetError;

  async fn fetch(&self) -> Result<Vec<Entry>, SheetError> {
    tracing::debug!(url = %self.url, "fetching entries");
    let resp = self.client.get(&self.url).send().await?;

    if !resp.status().is_success() {
      return Err(SheetError::Status(resp.status()));
    }
    let envelope: Envelope = resp.json().await?;
    Ok(decode_rows(envelope.data.unwrap_or_default()))
  }
}
