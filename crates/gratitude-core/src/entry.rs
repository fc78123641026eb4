//! Entry types: the diary record fetched from the remote sheet and the
//! ranking rows produced from it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

// ─── Entry ───────────────────────────────────────────────────────────────────

/// One diary record. The `date` never changes once fetched.
///
/// Every sequence field tolerates being missing or `null` in the remote
/// payload and is read as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
  #[serde(deserialize_with = "de_date")]
  pub date:       NaiveDate,
  #[serde(default, deserialize_with = "null_as_default")]
  pub story:      String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub learned:    String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub grateful:   Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub mistake:    Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub people:     Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub good_habit: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub bad_habit:  Vec<String>,
}

impl Entry {
  /// An entry on `date` with every text field empty.
  pub fn on(date: NaiveDate) -> Self {
    Self {
      date,
      story: String::new(),
      learned: String::new(),
      grateful: Vec::new(),
      mistake: Vec::new(),
      people: Vec::new(),
      good_habit: Vec::new(),
      bad_habit: Vec::new(),
    }
  }
}

// ─── FrequencyEntry ──────────────────────────────────────────────────────────

/// A `(label, count)` row produced by a ranking aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
  pub key:   String,
  pub value: usize,
}

impl FrequencyEntry {
  pub fn new(key: impl Into<String>, value: usize) -> Self {
    Self {
      key: key.into(),
      value,
    }
  }
}

// ─── Date parsing ────────────────────────────────────────────────────────────

/// Parse the ISO-ish date strings the sheet endpoint emits.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps. Timestamps yield the calendar date
/// in their own offset.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
  let s = raw.trim();
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Ok(d);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.date_naive());
  }
  if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(dt.date());
  }
  Err(Error::InvalidDate(raw.to_owned()))
}

fn de_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_date(&raw).map_err(serde::de::Error::custom)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
