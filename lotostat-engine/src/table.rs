//! Shapes occurrence maps into display tables.
//!
//! Bucket columns are named `{k}次` ("drawn k times"). Each builder works in
//! two passes: size the bucket range, then allocate a fixed-shape grid and
//! fill it.

use serde::Serialize;

use crate::aggregate::{IntervalWindow, PeriodWindow};
use crate::config::EngineConfig;
use crate::counter::{digit_key, DigitSet, OccurrenceMap};
use crate::error::{EngineError, Result};

pub const PERIOD_COLUMN: &str = "期号";
pub const INTERVAL_COLUMN: &str = "间隔";

pub fn bucket_column(count: u32) -> String {
    format!("{count}次")
}

pub fn period_label(period: u32) -> String {
    format!("{period}期")
}

pub fn interval_label(interval: u32) -> String {
    format!("{interval}期间隔")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    /// `buckets` count columns followed by the label column, `height` blank rows.
    fn blank(buckets: u32, label_column: &str, height: usize) -> Self {
        let mut columns: Vec<String> = (0..buckets).map(bucket_column).collect();
        columns.push(label_column.to_string());
        let rows = vec![vec![String::new(); columns.len()]; height];
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Index of the trailing label column.
    fn label_index(&self) -> usize {
        self.columns.len() - 1
    }
}

fn digit_label(digit: u8, next: Option<&DigitSet>, marker: &str) -> String {
    let mut label = digit_key(digit);
    if next.is_some_and(|set| set.contains(&digit)) {
        label.push_str(marker);
    }
    label
}

/// One window laid out vertically: each bucket column lists its digits one
/// per row, and the period label sits on row 0.
pub fn single_window_table(
    occurrences: &OccurrenceMap,
    next: &DigitSet,
    period: u32,
    config: &EngineConfig,
) -> Result<DisplayTable> {
    let max_count = occurrences.max_count().ok_or(EngineError::EmptyResult)?;
    let buckets = max_count + 1;

    let mut heights = vec![0usize; buckets as usize];
    for (_, count) in occurrences.iter() {
        heights[count as usize] += 1;
    }
    let height = heights.iter().copied().max().unwrap_or(0).max(1);

    let mut table = DisplayTable::blank(buckets, PERIOD_COLUMN, height);
    let mut cursor = vec![0usize; buckets as usize];
    for (digit, count) in occurrences.iter() {
        let col = count as usize;
        table.rows[cursor[col]][col] = digit_label(digit, Some(next), &config.marker);
        cursor[col] += 1;
    }
    let label = table.label_index();
    table.rows[0][label] = period_label(period);

    Ok(table)
}

fn fill_bucket_row(
    row: &mut [String],
    occurrences: &OccurrenceMap,
    next: Option<&DigitSet>,
    config: &EngineConfig,
) {
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); row.len() - 1];
    for (digit, count) in occurrences.iter() {
        cells[count as usize].push(digit_label(digit, next, &config.marker));
    }
    for (slot, labels) in row.iter_mut().zip(cells) {
        *slot = labels.join(&config.separator);
    }
}

/// One row per chained window over a fixed set of `config.chain_buckets`
/// bucket columns. No next-draw markers.
pub fn multi_period_table(windows: &[PeriodWindow], config: &EngineConfig) -> Result<DisplayTable> {
    if windows.is_empty() || windows.iter().all(|w| w.occurrences.is_empty()) {
        return Err(EngineError::EmptyResult);
    }
    let buckets = config.chain_buckets;
    if let Some(count) = windows
        .iter()
        .filter_map(|w| w.occurrences.max_count())
        .find(|&c| c >= buckets)
    {
        return Err(EngineError::BucketOverflow { count, buckets });
    }

    let mut table = DisplayTable::blank(buckets, PERIOD_COLUMN, windows.len());
    let label = table.label_index();
    for (row, window) in table.rows.iter_mut().zip(windows) {
        fill_bucket_row(row, &window.occurrences, None, config);
        row[label] = period_label(window.period);
    }
    Ok(table)
}

/// One row per multiplier window; the bucket range spans the highest count
/// of the whole batch so every row shares the same columns.
pub fn multiplier_table(
    windows: &[IntervalWindow],
    next: &DigitSet,
    config: &EngineConfig,
) -> Result<DisplayTable> {
    let max_count = windows
        .iter()
        .filter_map(|w| w.occurrences.max_count())
        .max()
        .ok_or(EngineError::EmptyResult)?;

    let mut table = DisplayTable::blank(max_count + 1, INTERVAL_COLUMN, windows.len());
    let label = table.label_index();
    for (row, window) in table.rows.iter_mut().zip(windows) {
        fill_bucket_row(row, &window.occurrences, Some(next), config);
        row[label] = interval_label(window.interval);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{by_multiplier, chain};
    use crate::counter::count;
    use lotostat_db::dataset::Dataset;
    use lotostat_db::models::{DrawRow, DIGIT_ALPHABET};

    fn sample() -> Dataset {
        Dataset::new(vec![
            DrawRow::filled(1, &[0, 4]),
            DrawRow::filled(2, &[5]),
            DrawRow::new(3, vec![Some(1), Some(2), Some(2)]),
            DrawRow::filled(4, &[7]),
            DrawRow::filled(5, &[1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_window_layout() {
        let config = EngineConfig::default();
        let occ = count(&sample(), 4, 2, DIGIT_ALPHABET);
        let next = DigitSet::from([1]);
        let table = single_window_table(&occ, &next, 4, &config).unwrap();

        assert_eq!(table.columns, vec!["0次", "1次", "期号"]);
        // Seven unseen digits stack in the 0次 column.
        assert_eq!(table.rows.len(), 7);
        assert_eq!(table.cell(0, "0次"), Some("q0"));
        assert_eq!(table.cell(6, "0次"), Some("q9"));
        assert_eq!(table.cell(0, "1次"), Some("q1$"));
        assert_eq!(table.cell(1, "1次"), Some("q2"));
        assert_eq!(table.cell(2, "1次"), Some("q7"));
        assert_eq!(table.cell(3, "1次"), Some(""));
        assert_eq!(table.cell(0, "期号"), Some("4期"));
        assert_eq!(table.cell(1, "期号"), Some(""));
    }

    #[test]
    fn test_single_window_is_repeatable() {
        let config = EngineConfig::default();
        let occ = count(&sample(), 5, 5, DIGIT_ALPHABET);
        let next = DigitSet::from([2, 7]);
        let first = single_window_table(&occ, &next, 5, &config).unwrap();
        let second = single_window_table(&occ, &next, 5, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_window_empty_map() {
        let config = EngineConfig::default();
        let occ = OccurrenceMap::zeroed(0);
        assert_eq!(
            single_window_table(&occ, &DigitSet::new(), 1, &config),
            Err(EngineError::EmptyResult)
        );
    }

    #[test]
    fn test_multi_period_fixed_buckets() {
        let config = EngineConfig::default();
        let windows = chain(&sample(), 5, 2, 2, DIGIT_ALPHABET).unwrap();
        let table = multi_period_table(&windows, &config).unwrap();

        assert_eq!(table.columns.len(), 12);
        assert_eq!(table.columns[10], "10次");
        assert_eq!(table.columns[11], "期号");
        assert_eq!(table.rows.len(), 2);

        assert_eq!(table.cell(0, "1次"), Some("q1, q7"));
        assert_eq!(table.cell(0, "0次"), Some("q0, q2, q3, q4, q5, q6, q8, q9"));
        assert_eq!(table.cell(0, "2次"), Some(""));
        assert_eq!(table.cell(0, "期号"), Some("5期"));
        assert_eq!(table.cell(1, "1次"), Some("q1, q2, q5"));
        assert_eq!(table.cell(1, "期号"), Some("3期"));
    }

    #[test]
    fn test_multi_period_overflow() {
        let rows = (1..=12).map(|p| DrawRow::filled(p, &[3])).collect();
        let ds = Dataset::new(rows).unwrap();
        let windows = chain(&ds, 12, 1, 12, DIGIT_ALPHABET).unwrap();
        assert_eq!(
            multi_period_table(&windows, &EngineConfig::default()),
            Err(EngineError::BucketOverflow { count: 12, buckets: 11 })
        );
    }

    #[test]
    fn test_multi_period_empty() {
        assert_eq!(
            multi_period_table(&[], &EngineConfig::default()),
            Err(EngineError::EmptyResult)
        );
    }

    #[test]
    fn test_multiplier_shared_columns_and_markers() {
        let config = EngineConfig::default();
        let windows = by_multiplier(&sample(), 5, 1, 3, DIGIT_ALPHABET).unwrap();
        let next = DigitSet::from([7]);
        let table = multiplier_table(&windows, &next, &config).unwrap();

        // Interval 3 sees q1 twice, so every row gets 0次..2次.
        assert_eq!(table.columns, vec!["0次", "1次", "2次", "间隔"]);
        assert_eq!(table.cell(0, "1次"), Some("q1"));
        assert_eq!(table.cell(0, "2次"), Some(""));
        assert_eq!(table.cell(0, "间隔"), Some("1期间隔"));
        assert_eq!(table.cell(1, "1次"), Some("q1, q7$"));
        assert_eq!(table.cell(2, "1次"), Some("q2, q7$"));
        assert_eq!(table.cell(2, "2次"), Some("q1"));
        assert_eq!(table.cell(2, "间隔"), Some("3期间隔"));
    }

    #[test]
    fn test_multiplier_custom_separator() {
        let config = EngineConfig {
            separator: "\n".to_string(),
            marker: "*".to_string(),
            ..EngineConfig::default()
        };
        let windows = by_multiplier(&sample(), 4, 2, 1, DIGIT_ALPHABET).unwrap();
        let table = multiplier_table(&windows, &DigitSet::from([2]), &config).unwrap();
        assert_eq!(table.cell(0, "1次"), Some("q1\nq2*\nq7"));
    }

    #[test]
    fn test_multiplier_empty() {
        assert_eq!(
            multiplier_table(&[], &DigitSet::new(), &EngineConfig::default()),
            Err(EngineError::EmptyResult)
        );
    }
}
