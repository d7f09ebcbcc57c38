use std::collections::BTreeSet;

use anyhow::{bail, Result};

use crate::models::DrawRow;

/// Draw history ordered by period.
///
/// Periods are positive and strictly increasing, which lets window lookups
/// binary-search instead of scanning every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    rows: Vec<DrawRow>,
}

impl Dataset {
    pub fn new(rows: Vec<DrawRow>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.period < 1 {
                bail!("Period {} at row {} is not a positive number", row.period, i + 1);
            }
            if i > 0 && row.period <= rows[i - 1].period {
                bail!(
                    "Period {} at row {} does not follow period {} (periods must be strictly increasing)",
                    row.period,
                    i + 1,
                    rows[i - 1].period
                );
            }
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_period(&self) -> Option<u32> {
        self.rows.first().map(|r| r.period)
    }

    pub fn last_period(&self) -> Option<u32> {
        self.rows.last().map(|r| r.period)
    }

    /// The `n` most recent rows, oldest first.
    pub fn last(&self, n: usize) -> &[DrawRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    pub fn row(&self, period: u32) -> Option<&DrawRow> {
        self.rows
            .binary_search_by_key(&period, |r| r.period)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Rows with `reference - length < period <= reference`.
    pub fn window_rows(&self, reference: u32, length: u32) -> &[DrawRow] {
        let lower = reference.saturating_sub(length);
        let start = self.rows.partition_point(|r| r.period <= lower);
        let end = self.rows.partition_point(|r| r.period <= reference);
        if start >= end {
            return &[];
        }
        &self.rows[start..end]
    }

    /// Distinct digits drawn in `period`, or `None` when the period is absent.
    pub fn digits_at(&self, period: u32) -> Option<BTreeSet<u8>> {
        self.row(period).map(|r| r.present().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            DrawRow::filled(1, &[0, 4]),
            DrawRow::filled(2, &[5]),
            DrawRow::new(3, vec![Some(1), Some(2), Some(2)]),
            DrawRow::filled(4, &[7]),
            DrawRow::new(5, vec![Some(1), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_unordered_periods() {
        let rows = vec![DrawRow::filled(2, &[1]), DrawRow::filled(1, &[2])];
        assert!(Dataset::new(rows).is_err());
    }

    #[test]
    fn test_rejects_duplicate_periods() {
        let rows = vec![DrawRow::filled(2, &[1]), DrawRow::filled(2, &[2])];
        assert!(Dataset::new(rows).is_err());
    }

    #[test]
    fn test_rejects_period_zero() {
        assert!(Dataset::new(vec![DrawRow::filled(0, &[1])]).is_err());
    }

    #[test]
    fn test_window_rows_bounds() {
        let ds = sample();
        let periods: Vec<u32> = ds.window_rows(4, 2).iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![3, 4]);

        let periods: Vec<u32> = ds.window_rows(2, 10).iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![1, 2]);

        assert!(ds.window_rows(4, 0).is_empty());
        assert!(ds.window_rows(40, 5).is_empty());
    }

    #[test]
    fn test_window_rows_with_gaps() {
        let ds = Dataset::new(vec![
            DrawRow::filled(10, &[1]),
            DrawRow::filled(12, &[2]),
            DrawRow::filled(15, &[3]),
        ])
        .unwrap();
        let periods: Vec<u32> = ds.window_rows(14, 4).iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![12]);
    }

    #[test]
    fn test_digits_at() {
        let ds = sample();
        assert_eq!(ds.digits_at(3), Some(BTreeSet::from([1, 2])));
        assert_eq!(ds.digits_at(5), Some(BTreeSet::from([1])));
        assert_eq!(ds.digits_at(6), None);
    }

    #[test]
    fn test_last() {
        let ds = sample();
        let periods: Vec<u32> = ds.last(2).iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![4, 5]);
        assert_eq!(ds.last(100).len(), 5);
        assert_eq!(ds.first_period(), Some(1));
        assert_eq!(ds.last_period(), Some(5));
    }
}
