//! Insertion-ordered `label -> count` map backing every ranking.

use std::collections::HashMap;

use crate::FrequencyEntry;

/// Counts labels while remembering the order in which each distinct label was
/// first seen. Iteration and ranking follow that order, which makes ties in
/// [`FrequencyMap::ranked`] deterministic.
#[derive(Debug, Clone, Default)]
pub struct FrequencyMap {
  index: HashMap<String, usize>,
  slots: Vec<(String, usize)>,
}

impl FrequencyMap {
  pub fn new() -> Self { Self::default() }

  /// Add `amount` to `label`, inserting it at the back if unseen.
  pub fn add(&mut self, label: &str, amount: usize) {
    match self.index.get(label) {
      Some(&i) => self.slots[i].1 += amount,
      None => {
        self.index.insert(label.to_owned(), self.slots.len());
        self.slots.push((label.to_owned(), amount));
      }
    }
  }

  /// Count one occurrence of `label`.
  pub fn bump(&mut self, label: &str) { self.add(label, 1); }

  pub fn get(&self, label: &str) -> Option<usize> {
    self.index.get(label).map(|&i| self.slots[i].1)
  }

  pub fn len(&self) -> usize { self.slots.len() }

  pub fn is_empty(&self) -> bool { self.slots.is_empty() }

  /// Entries in first-seen order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
    self.slots.iter().map(|(k, v)| (k.as_str(), *v))
  }

  /// Rows sorted by count descending; equal counts keep first-seen order.
  pub fn ranked(self) -> Vec<FrequencyEntry> {
    let mut rows: Vec<FrequencyEntry> = self
      .slots
      .into_iter()
      .map(|(key, value)| FrequencyEntry { key, value })
      .collect();
    // `sort_by` is stable.
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    rows
  }
}

impl<'a> FromIterator<&'a str> for FrequencyMap {
  fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
    let mut map = Self::new();
    for label in iter {
      map.bump(label);
    }
    map
  }
}
