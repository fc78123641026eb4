//! Pure reductions over an already date-filtered list of entries.
//!
//! Every function takes anything that iterates `&Entry`, so callers can pass
//! `&Vec<Entry>` as well as the `Vec<&Entry>` a snapshot filter returns
//! (via `.iter().copied()`). Nothing here performs I/O or mutates its input.
//!
//! Rankings break ties by the order in which each key was first encountered
//! while scanning the input. Empty-string labels are counted like any other
//! label.

use std::collections::HashSet;

use crate::{Entry, FrequencyEntry, frequency::FrequencyMap};

/// Row limit used by the bounded rankings when the caller gives none.
pub const DEFAULT_LIMIT: usize = 10;

// ─── Labelled frequency ──────────────────────────────────────────────────────

/// Flatten the labels `field` yields for each entry and count each one.
fn label_frequency<'a, I, F>(entries: I, field: F) -> FrequencyMap
where
  I: IntoIterator<Item = &'a Entry>,
  F: Fn(&'a Entry) -> &'a [String],
{
  entries
    .into_iter()
    .flat_map(|e| field(e).iter().map(String::as_str))
    .collect()
}

/// The `limit` most mentioned people.
pub fn top_people<'a, I>(entries: I, limit: usize) -> Vec<FrequencyEntry>
where
  I: IntoIterator<Item = &'a Entry>,
{
  let mut rows = label_frequency(entries, |e| e.people.as_slice()).ranked();
  rows.truncate(limit);
  rows
}

/// Every good habit, most frequent first.
pub fn good_habits<'a, I>(entries: I) -> Vec<FrequencyEntry>
where
  I: IntoIterator<Item = &'a Entry>,
{
  label_frequency(entries, |e| e.good_habit.as_slice()).ranked()
}

/// Every bad habit, most frequent first.
pub fn bad_habits<'a, I>(entries: I) -> Vec<FrequencyEntry>
where
  I: IntoIterator<Item = &'a Entry>,
{
  label_frequency(entries, |e| e.bad_habit.as_slice()).ranked()
}

// ─── Scalar counts ───────────────────────────────────────────────────────────

pub fn count_entries<'a, I>(entries: I) -> usize
where
  I: IntoIterator<Item = &'a Entry>,
{
  entries.into_iter().count()
}

/// Number of grateful items across all entries. Duplicates count.
pub fn total_grateful_things<'a, I>(entries: I) -> usize
where
  I: IntoIterator<Item = &'a Entry>,
{
  entries.into_iter().map(|e| e.grateful.len()).sum()
}

/// Number of mistakes across all entries. Duplicates count.
pub fn total_mistakes<'a, I>(entries: I) -> usize
where
  I: IntoIterator<Item = &'a Entry>,
{
  entries.into_iter().map(|e| e.mistake.len()).sum()
}

/// Number of distinct names mentioned.
pub fn count_unique_people<'a, I>(entries: I) -> usize
where
  I: IntoIterator<Item = &'a Entry>,
{
  entries
    .into_iter()
    .flat_map(|e| e.people.iter().map(String::as_str))
    .collect::<HashSet<_>>()
    .len()
}

// ─── Per-day rankings ────────────────────────────────────────────────────────

/// Group by date and weight each date by the total character count of the
/// strings `field` yields for its entries.
fn day_weights<'a, I, F>(entries: I, field: F, limit: usize) -> Vec<FrequencyEntry>
where
  I: IntoIterator<Item = &'a Entry>,
  F: Fn(&'a Entry) -> &'a [String],
{
  let mut map = FrequencyMap::new();
  for entry in entries {
    let chars = field(entry).iter().map(|s| s.chars().count()).sum();
    map.add(&entry.date.to_string(), chars);
  }
  let mut rows = map.ranked();
  rows.truncate(limit);
  rows
}

/// Dates with the most written in `grateful`, measured in characters.
pub fn most_grateful_days<'a, I>(entries: I, limit: usize) -> Vec<FrequencyEntry>
where
  I: IntoIterator<Item = &'a Entry>,
{
  day_weights(entries, |e| e.grateful.as_slice(), limit)
}

/// Dates with the most written in `mistake`, measured in characters.
pub fn most_regrettable_days<'a, I>(
  entries: I,
  limit: usize,
) -> Vec<FrequencyEntry>
where
  I: IntoIterator<Item = &'a Entry>,
{
  day_weights(entries, |e| e.mistake.as_slice(), limit)
}
