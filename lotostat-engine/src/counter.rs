use std::collections::BTreeSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use lotostat_db::dataset::Dataset;

use crate::error::{EngineError, Result};

pub type DigitSet = BTreeSet<u8>;

/// Key under which a digit is reported (`q0`, `q1`, ...).
pub fn digit_key(digit: u8) -> String {
    format!("q{digit}")
}

/// Per-digit count of periods in a window that drew the digit at least once.
///
/// Always holds one entry per digit of the alphabet, zero when unseen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceMap {
    counts: Vec<u32>,
}

impl OccurrenceMap {
    pub fn zeroed(alphabet: u8) -> Self {
        Self {
            counts: vec![0; alphabet as usize],
        }
    }

    pub fn get(&self, digit: u8) -> u32 {
        self.counts.get(digit as usize).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn max_count(&self) -> Option<u32> {
        self.counts.iter().copied().max()
    }

    /// `(digit, count)` pairs in digit order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts.iter().enumerate().map(|(d, &c)| (d as u8, c))
    }
}

impl Serialize for OccurrenceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (digit, count) in self.iter() {
            map.serialize_entry(&digit_key(digit), &count)?;
        }
        map.end()
    }
}

/// Counts digit presence over periods `(reference - length, reference]`.
///
/// A digit repeated inside one row counts once for that row. Digits outside
/// `0..alphabet` are ignored. An empty window yields the all-zero map.
pub fn count(dataset: &Dataset, reference: u32, length: u32, alphabet: u8) -> OccurrenceMap {
    let mut occurrences = OccurrenceMap::zeroed(alphabet);
    let mut seen = vec![false; alphabet as usize];

    for row in dataset.window_rows(reference, length) {
        seen.iter_mut().for_each(|s| *s = false);
        for digit in row.present() {
            let idx = digit as usize;
            if idx < seen.len() && !seen[idx] {
                seen[idx] = true;
                occurrences.counts[idx] += 1;
            }
        }
    }

    occurrences
}

/// Distinct digits drawn in the period right after `period`.
pub fn next_draw_digits(dataset: &Dataset, period: u32) -> Result<DigitSet> {
    let next = period.saturating_add(1);
    dataset
        .digits_at(next)
        .ok_or(EngineError::MissingPeriod { period: next })
}
