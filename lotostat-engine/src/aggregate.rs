//! Window aggregators built on top of [`count`].
//!
//! Every aggregator validates its parameters before the first window is
//! counted, so a failing call never does partial work.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use lotostat_db::dataset::Dataset;

use crate::counter::{count, digit_key, OccurrenceMap};
use crate::error::{require_positive, EngineError, Result};

/// One window of a backward chain, labelled by its reference period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub period: u32,
    pub occurrences: OccurrenceMap,
}

/// One window of a multiplier family, labelled by its effective length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalWindow {
    pub interval: u32,
    /// The window would start below period 1 and only sees part of its length.
    pub truncated: bool,
    pub occurrences: OccurrenceMap,
}

/// Rate values per digit; every digit holds a series of the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateSeries {
    series: Vec<Vec<f64>>,
}

impl RateSeries {
    fn with_alphabet(alphabet: u8, capacity: usize) -> Self {
        Self {
            series: (0..alphabet).map(|_| Vec::with_capacity(capacity)).collect(),
        }
    }

    fn push(&mut self, occurrences: &OccurrenceMap, divisor: u32) {
        for (digit, rates) in self.series.iter_mut().enumerate() {
            rates.push(occurrences.get(digit as u8) as f64 / divisor as f64);
        }
    }

    pub fn get(&self, digit: u8) -> Option<&[f64]> {
        self.series.get(digit as usize).map(Vec::as_slice)
    }

    /// Number of digits covered.
    pub fn digits(&self) -> usize {
        self.series.len()
    }

    /// Number of points in each digit's series.
    pub fn points(&self) -> usize {
        self.series.first().map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &[f64])> + '_ {
        self.series
            .iter()
            .enumerate()
            .map(|(d, rates)| (d as u8, rates.as_slice()))
    }

    fn reverse_points(&mut self) {
        self.series.iter_mut().for_each(|rates| rates.reverse());
    }
}

impl Serialize for RateSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len()))?;
        for (digit, rates) in self.iter() {
            map.serialize_entry(&digit_key(digit), rates)?;
        }
        map.end()
    }
}

/// Heatmap rates and the first period of each window, both oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    #[serde(rename = "results")]
    pub rates: RateSeries,
    pub periods: Vec<u32>,
}

/// `start - back` as a signed period, saturating for spans beyond `i64`.
fn period_before(start: u32, back: u64) -> i64 {
    (start as i64).saturating_sub(i64::try_from(back).unwrap_or(i64::MAX))
}

pub fn fixed(dataset: &Dataset, start_period: u32, interval: u32, alphabet: u8) -> Result<OccurrenceMap> {
    require_positive("start_period", start_period)?;
    require_positive("interval", interval)?;
    Ok(count(dataset, start_period, interval, alphabet))
}

/// Windows of length `step` ending at `start_period`, `start_period - step`, ...
/// Most recent first.
pub fn chain(
    dataset: &Dataset,
    start_period: u32,
    num_windows: u32,
    step: u32,
    alphabet: u8,
) -> Result<Vec<PeriodWindow>> {
    require_positive("start_period", start_period)?;
    require_positive("num_windows", num_windows)?;
    require_positive("step", step)?;

    let back = (num_windows as u64 - 1) * step as u64;
    if back >= start_period as u64 {
        return Err(EngineError::InvalidRange {
            period: period_before(start_period, back),
        });
    }

    Ok((0..num_windows)
        .map(|i| {
            let period = start_period - i * step;
            PeriodWindow {
                period,
                occurrences: count(dataset, period, step, alphabet),
            }
        })
        .collect())
}

/// Windows ending at `start_period` with lengths `base_interval * 1..=num_multipliers`.
///
/// Windows reaching below period 1 are counted over the rows that exist and
/// flagged as truncated.
pub fn by_multiplier(
    dataset: &Dataset,
    start_period: u32,
    base_interval: u32,
    num_multipliers: u32,
    alphabet: u8,
) -> Result<Vec<IntervalWindow>> {
    require_positive("start_period", start_period)?;
    require_positive("base_interval", base_interval)?;
    require_positive("num_multipliers", num_multipliers)?;
    if base_interval.checked_mul(num_multipliers).is_none() {
        return Err(EngineError::InvalidArgument {
            name: "num_multipliers",
            reason: "widest window overflows the period range",
        });
    }

    Ok((1..=num_multipliers)
        .map(|multiplier| {
            let interval = base_interval * multiplier;
            IntervalWindow {
                interval,
                truncated: interval > start_period,
                occurrences: count(dataset, start_period, interval, alphabet),
            }
        })
        .collect())
}

/// Consecutive non-overlapping windows of `window_length` stepping back from
/// `start_period`, normalised to rates in `[0, 1]`.
pub fn heatmap(
    dataset: &Dataset,
    start_period: u32,
    window_length: u32,
    num_windows: u32,
    alphabet: u8,
) -> Result<Heatmap> {
    require_positive("start_period", start_period)?;
    require_positive("window_length", window_length)?;
    require_positive("num_windows", num_windows)?;

    let span = window_length as u64 * num_windows as u64;
    if span >= start_period as u64 {
        return Err(EngineError::InvalidRange {
            period: period_before(start_period, span),
        });
    }
    // span < start_period, so it fits in u32.
    let span_start = start_period - span as u32;

    let mut rates = RateSeries::with_alphabet(alphabet, num_windows as usize);
    for i in 0..num_windows {
        let period = start_period - i * window_length;
        let occurrences = count(dataset, period, window_length, alphabet);
        rates.push(&occurrences, window_length);
    }
    // Counted newest first; labels run oldest first.
    rates.reverse_points();

    let first = span_start + 1;
    let periods = (0..num_windows).map(|j| first + j * window_length).collect();

    Ok(Heatmap { rates, periods })
}

/// Growing windows of length `1..=max_interval` ending at `start_period`.
/// Index 0 of each series is interval 1.
pub fn accumulative(
    dataset: &Dataset,
    start_period: u32,
    max_interval: u32,
    alphabet: u8,
) -> Result<RateSeries> {
    require_positive("start_period", start_period)?;
    require_positive("max_interval", max_interval)?;

    let mut rates = RateSeries::with_alphabet(alphabet, max_interval as usize);
    for interval in 1..=max_interval {
        let occurrences = count(dataset, start_period, interval, alphabet);
        rates.push(&occurrences, interval);
    }
    Ok(rates)
}
