use anyhow::{bail, Result};

/// Number of distinct digits a draw cell can hold (0-9).
pub const DIGIT_ALPHABET: u8 = 10;

/// One row of the draw history: a period number and the digits drawn in it.
///
/// Cells may be blank, so digits are kept as `Option<u8>` in their original
/// column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRow {
    pub period: u32,
    pub digits: Vec<Option<u8>>,
}

impl DrawRow {
    pub fn new(period: u32, digits: Vec<Option<u8>>) -> Self {
        Self { period, digits }
    }

    /// Builds a row where every cell is filled.
    pub fn filled(period: u32, digits: &[u8]) -> Self {
        Self {
            period,
            digits: digits.iter().copied().map(Some).collect(),
        }
    }

    /// Non-blank digits of the row, repeats included.
    pub fn present(&self) -> impl Iterator<Item = u8> + '_ {
        self.digits.iter().flatten().copied()
    }

    pub fn is_blank(&self) -> bool {
        self.digits.iter().all(Option::is_none)
    }
}

pub fn validate_row(row: &DrawRow, alphabet: u8) -> Result<()> {
    if row.period < 1 {
        bail!("Period {} is not a positive number", row.period);
    }
    for d in row.present() {
        if d >= alphabet {
            bail!(
                "Digit {} out of range (0-{}) in period {}",
                d,
                alphabet.saturating_sub(1),
                row.period
            );
        }
    }
    Ok(())
}
