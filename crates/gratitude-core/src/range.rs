//! Inclusive date-range filter over entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` selection by entry date.
///
/// A missing bound is open on that side; with both missing every date
/// matches. A range whose `start` is after its `end` matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

impl DateRange {
  pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
    Self { start, end }
  }

  /// The unbounded range.
  pub fn all() -> Self { Self::default() }

  /// A single calendar day, used as both bounds.
  pub fn day(date: NaiveDate) -> Self {
    Self {
      start: Some(date),
      end:   Some(date),
    }
  }

  pub fn is_unbounded(&self) -> bool {
    self.start.is_none() && self.end.is_none()
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
  }
}
