mod display;
mod export;
mod import;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use lotostat_db::dataset::Dataset;
use lotostat_db::models::DrawRow;
use lotostat_engine::aggregate::{accumulative, by_multiplier, chain, fixed, heatmap, IntervalWindow};
use lotostat_engine::counter::{next_draw_digits, DigitSet};
use lotostat_engine::table::{multi_period_table, multiplier_table, single_window_table, DisplayTable};
use lotostat_engine::EngineConfig;

use crate::display::{
    display_accumulative, display_heatmap, display_import_summary, display_rows, display_table,
};
use crate::export::export_table;

#[derive(Parser)]
#[command(name = "lotostat", about = "Digit occurrence statistics over a lottery draw history")]
struct Cli {
    /// Draw history: CSV with a header, the period in column 1, digits after
    #[arg(short, long, global = true, default_value = "data/draws.csv")]
    file: PathBuf,

    /// Field delimiter of the draw history
    #[arg(long, global = true, default_value = ",")]
    delimiter: char,

    /// Engine configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the most recent draws
    List {
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Count digit occurrences over one window ending at a period
    Fixed {
        /// Reference period (window end, inclusive)
        #[arg(short, long)]
        start: u32,

        /// Window length in periods
        #[arg(short, long)]
        interval: u32,

        /// Also write the table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Chain consecutive windows backward from a period
    Multi {
        #[arg(short, long)]
        start: u32,

        /// Number of windows in the chain
        #[arg(short, long)]
        windows: u32,

        /// Length of each window, also the step between windows
        #[arg(short, long)]
        interval: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Occurrence rates of consecutive windows, oldest first
    Heatmap {
        #[arg(short, long)]
        start: u32,

        /// Length of each window
        #[arg(short, long)]
        interval: u32,

        /// Number of windows
        #[arg(short, long)]
        windows: u32,

        /// Draw an ASCII chart per digit
        #[arg(short, long)]
        plot: bool,
    },

    /// Windows ending at one period with lengths interval × 1..=multipliers
    Multipliers {
        #[arg(short, long)]
        start: u32,

        /// Base window length
        #[arg(short, long)]
        interval: u32,

        /// Number of multipliers
        #[arg(short, long, default_value = "5")]
        multipliers: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Occurrence rates of growing windows 1..=interval ending at a period
    Accumulative {
        #[arg(short, long)]
        start: u32,

        /// Largest window length
        #[arg(short, long)]
        interval: u32,

        #[arg(short, long)]
        plot: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = load_config(cli.config.as_deref())?;
    if !cli.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }
    let (dataset, summary) = import::import_csv(&cli.file, cli.delimiter as u8, config.alphabet_size)?;
    if dataset.is_empty() {
        bail!("No draws found in {:?}", cli.file);
    }
    if !cli.json {
        display_import_summary(&summary);
    }

    let out = Output { json: cli.json };

    match cli.command {
        Command::List { last } => {
            display_rows(dataset.last(last));
            Ok(())
        }
        Command::Fixed { start, interval, output } => {
            cmd_fixed(&dataset, &config, &out, start, interval, output.as_deref())
        }
        Command::Multi {
            start,
            windows,
            interval,
            output,
        } => cmd_multi(&dataset, &config, &out, start, windows, interval, output.as_deref()),
        Command::Heatmap {
            start,
            interval,
            windows,
            plot,
        } => cmd_heatmap(&dataset, &config, &out, start, interval, windows, plot),
        Command::Multipliers {
            start,
            interval,
            multipliers,
            output,
        } => cmd_multipliers(&dataset, &config, &out, start, interval, multipliers, output.as_deref()),
        Command::Accumulative { start, interval, plot } => {
            cmd_accumulative(&dataset, &config, &out, start, interval, plot)
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {} - line:{} - {}",
            record.level(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.module_path().unwrap_or("-"),
            record.line().unwrap_or(0),
            record.args()
        )
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Cannot open log file {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Logger already initialised")?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read {:?}", path))?;
            serde_json::from_str::<EngineConfig>(&json)
                .with_context(|| format!("Invalid JSON in {:?}", path))?
        }
        None => EngineConfig::default(),
    };
    config.validate().context("Invalid engine configuration")?;
    Ok(config)
}

/// Digits of the draw after `start`. A missing next period disables markers.
fn next_draw_markers(dataset: &Dataset, start: u32) -> DigitSet {
    match next_draw_digits(dataset, start) {
        Ok(digits) => {
            if dataset.row(start.saturating_add(1)).is_some_and(DrawRow::is_blank) {
                log::warn!("Period {} has no digits; no next-draw markers", start.saturating_add(1));
            }
            digits
        }
        Err(e) => {
            log::warn!("{e}; next-draw markers disabled");
            DigitSet::new()
        }
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn table<T: Serialize>(
        &self,
        title: &str,
        marker: Option<&str>,
        table: &DisplayTable,
        raw: &T,
        csv_path: Option<&Path>,
    ) -> Result<()> {
        if let Some(path) = csv_path {
            export_table(path, table)?;
        }
        if self.json {
            let payload = serde_json::json!({ "data": raw, "table": table });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        } else {
            display_table(title, marker, table);
        }
        Ok(())
    }
}

fn cmd_fixed(
    dataset: &Dataset,
    config: &EngineConfig,
    out: &Output,
    start: u32,
    interval: u32,
    csv_path: Option<&Path>,
) -> Result<()> {
    let next = next_draw_markers(dataset, start);
    let occurrences = fixed(dataset, start, interval, config.alphabet_size)?;
    let table = single_window_table(&occurrences, &next, start, config)?;
    out.table(
        &format!("Occurrences over {interval} periods up to period {start}"),
        Some(config.marker.as_str()),
        &table,
        &occurrences,
        csv_path,
    )
}

fn cmd_multi(
    dataset: &Dataset,
    config: &EngineConfig,
    out: &Output,
    start: u32,
    windows: u32,
    interval: u32,
    csv_path: Option<&Path>,
) -> Result<()> {
    let chained = chain(dataset, start, windows, interval, config.alphabet_size)
        .with_context(|| format!("Cannot chain {windows} windows back from period {start}"))?;
    let table = multi_period_table(&chained, config)?;
    out.table(
        &format!("{windows} windows of {interval} periods from period {start}"),
        None,
        &table,
        &chained,
        csv_path,
    )
}

fn cmd_heatmap(
    dataset: &Dataset,
    config: &EngineConfig,
    out: &Output,
    start: u32,
    interval: u32,
    windows: u32,
    plot: bool,
) -> Result<()> {
    let map = heatmap(dataset, start, interval, windows, config.alphabet_size)
        .with_context(|| format!("Cannot compute heatmap from period {start}"))?;
    if out.json {
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        display_heatmap(&map, plot);
    }
    Ok(())
}

/// One line per window that reaches before period 1, with the number of
/// periods actually present in it.
fn truncation_warnings(dataset: &Dataset, start: u32, windows: &[IntervalWindow]) -> Vec<String> {
    windows
        .iter()
        .filter(|w| w.truncated)
        .map(|w| {
            format!(
                "Window of {} periods at period {} reaches before period 1; only {} periods counted",
                w.interval,
                start,
                dataset.window_rows(start, w.interval).len()
            )
        })
        .collect()
}

fn cmd_multipliers(
    dataset: &Dataset,
    config: &EngineConfig,
    out: &Output,
    start: u32,
    interval: u32,
    multipliers: u32,
    csv_path: Option<&Path>,
) -> Result<()> {
    let next = next_draw_markers(dataset, start);
    let scaled = by_multiplier(dataset, start, interval, multipliers, config.alphabet_size)?;
    for warning in truncation_warnings(dataset, start, &scaled) {
        log::warn!("{warning}");
    }
    let table = multiplier_table(&scaled, &next, config)?;
    out.table(
        &format!("Windows of {interval} × 1..={multipliers} periods up to period {start}"),
        Some(config.marker.as_str()),
        &table,
        &scaled,
        csv_path,
    )
}

fn cmd_accumulative(
    dataset: &Dataset,
    config: &EngineConfig,
    out: &Output,
    start: u32,
    interval: u32,
    plot: bool,
) -> Result<()> {
    let rates = accumulative(dataset, start, interval, config.alphabet_size)?;
    if out.json {
        println!("{}", serde_json::to_string_pretty(&rates)?);
    } else {
        display_accumulative(&rates, plot);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotostat_db::models::DIGIT_ALPHABET;

    #[test]
    fn test_truncation_warnings_count_present_periods() {
        // History starts at period 3 and skips period 5.
        let dataset = Dataset::new(vec![
            DrawRow::filled(3, &[1]),
            DrawRow::filled(4, &[2]),
            DrawRow::filled(6, &[3]),
        ])
        .unwrap();
        let windows = by_multiplier(&dataset, 6, 4, 2, DIGIT_ALPHABET).unwrap();
        let warnings = truncation_warnings(&dataset, 6, &windows);
        assert_eq!(
            warnings,
            vec!["Window of 8 periods at period 6 reaches before period 1; only 3 periods counted"]
        );
    }

    #[test]
    fn test_next_draw_markers_degrade_without_next_period() {
        let dataset = Dataset::new(vec![
            DrawRow::filled(1, &[4, 4]),
            DrawRow::new(2, vec![None, None]),
        ])
        .unwrap();
        assert!(next_draw_markers(&dataset, 1).is_empty());
        assert!(next_draw_markers(&dataset, 2).is_empty());
        assert_eq!(next_draw_markers(&dataset, 0), DigitSet::from([4]));
    }
}
