use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};

use lotostat_db::dataset::Dataset;
use lotostat_db::models::{validate_row, DrawRow};

/// Parses a digit cell. Blank cells are `None`; spreadsheet exports that
/// write `3.0` for a whole number are accepted.
pub fn parse_digit(s: &str) -> Result<Option<u8>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(d) = s.parse::<u8>() {
        return Ok(Some(d));
    }
    let value = s
        .parse::<f64>()
        .with_context(|| format!("Cannot parse digit '{}'", s))?;
    if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
        bail!("Cannot parse digit '{}'", s);
    }
    Ok(Some(value as u8))
}

fn parse_period(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Ok(p) = s.parse::<u32>() {
        return Ok(p);
    }
    let value = s
        .parse::<f64>()
        .with_context(|| format!("Cannot parse period '{}'", s))?;
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        bail!("Cannot parse period '{}'", s);
    }
    Ok(value as u32)
}

fn parse_record(record: &csv::StringRecord, alphabet: u8) -> Result<DrawRow> {
    let period = record
        .get(0)
        .context("Missing period column")
        .and_then(parse_period)?;

    let digits = record
        .iter()
        .skip(1)
        .enumerate()
        .map(|(idx, cell)| {
            parse_digit(cell).with_context(|| format!("Column {} of period {}", idx + 2, period))
        })
        .collect::<Result<Vec<_>>>()?;

    let row = DrawRow::new(period, digits);
    validate_row(&row, alphabet)?;
    Ok(row)
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub total_records: u32,
    pub loaded: u32,
    pub errors: u32,
}

pub fn import_reader<R: Read>(reader: R, delimiter: u8, alphabet: u8) -> Result<(Dataset, ImportResult)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let mut result = ImportResult::default();
    let mut rows = Vec::new();

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record, alphabet) {
                Ok(row) => {
                    rows.push(row);
                    result.loaded += 1;
                }
                Err(e) => {
                    log::warn!("Skipping line {}: {:#}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                log::warn!("Cannot read line {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    let dataset = Dataset::new(rows)?;
    Ok((dataset, result))
}

pub fn import_csv(path: &Path, delimiter: u8, alphabet: u8) -> Result<(Dataset, ImportResult)> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        bail!("Invalid file format {:?}: expected a .csv file", path);
    }

    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {:?}", path))?;
    let (dataset, result) = import_reader(file, delimiter, alphabet)
        .with_context(|| format!("Cannot load draw history from {:?}", path))?;
    if let (Some(first), Some(last)) = (dataset.first_period(), dataset.last_period()) {
        log::info!(
            "Loaded {} periods ({}..={}) from {:?} ({} skipped)",
            dataset.len(),
            first,
            last,
            path,
            result.errors
        );
    }
    Ok((dataset, result))
}
