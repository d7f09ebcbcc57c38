use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use textplots::{Chart, Plot, Shape};

use crate::import::ImportResult;
use lotostat_db::models::DrawRow;
use lotostat_engine::aggregate::{Heatmap, RateSeries};
use lotostat_engine::counter::digit_key;
use lotostat_engine::table::DisplayTable;

pub fn display_rows(rows: &[DrawRow]) {
    if rows.is_empty() {
        println!("No draws to show.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Period", "Digits"]);

    for row in rows {
        let digits = row
            .digits
            .iter()
            .map(|d| d.map_or_else(|| "·".to_string(), |d| d.to_string()))
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![row.period.to_string(), digits]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Draw history:");
    println!("  Lines read    : {}", result.total_records);
    println!("  Periods loaded: {}", result.loaded);
    if result.errors > 0 {
        println!("  Skipped       : {}", result.errors);
    }
}

pub fn display_table(title: &str, marker: Option<&str>, data: &DisplayTable) {
    println!("\n== {title} ==\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(data.columns.clone());

    for row in &data.rows {
        table.add_row(row.iter().map(|value| {
            let cell = Cell::new(value);
            match marker {
                Some(m) if !m.is_empty() && value.contains(m) => cell.fg(Color::Green),
                _ => cell,
            }
        }));
    }
    println!("{table}");
}

fn rate_table(header_label: &str, labels: &[String], rates: &RateSeries) -> Table {
    let mut header = vec![header_label.to_string()];
    header.extend(labels.iter().cloned());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for (digit, series) in rates.iter() {
        let mut row = vec![Cell::new(digit_key(digit))];
        row.extend(series.iter().map(|r| {
            let cell = Cell::new(format!("{:.2}", r));
            if *r >= 0.5 {
                cell.fg(Color::Red)
            } else {
                cell
            }
        }));
        table.add_row(row);
    }
    table
}

pub fn display_heatmap(heatmap: &Heatmap, plot: bool) {
    println!("\n== Heatmap (occurrences / window length) ==\n");
    let labels: Vec<String> = heatmap.periods.iter().map(|p| p.to_string()).collect();
    println!("{}", rate_table("Digit \\ from period", &labels, &heatmap.rates));

    if plot {
        let xs: Vec<f32> = heatmap.periods.iter().map(|&p| p as f32).collect();
        plot_series(&heatmap.rates, &xs);
    }
}

pub fn display_accumulative(rates: &RateSeries, plot: bool) {
    println!("\n== Accumulative rates (occurrences / periods back) ==\n");
    let labels: Vec<String> = (1..=rates.points()).map(|i| i.to_string()).collect();
    println!("{}", rate_table("Digit \\ periods back", &labels, rates));

    if plot {
        let xs: Vec<f32> = (1..=rates.points()).map(|i| i as f32).collect();
        plot_series(rates, &xs);
    }
}

fn plot_series(rates: &RateSeries, xs: &[f32]) {
    let (Some(&x_min), Some(&x_max)) = (xs.first(), xs.last()) else {
        println!("  (Nothing to plot)");
        return;
    };
    // textplots needs a non-empty x range.
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };

    for (digit, series) in rates.iter() {
        let points: Vec<(f32, f32)> = xs
            .iter()
            .zip(series)
            .map(|(&x, &r)| (x, r as f32))
            .collect();

        println!("  {} :", digit_key(digit));
        let shape = Shape::Lines(&points);
        let mut chart = Chart::new_with_y_range(120, 40, x_min, x_max, 0.0, 1.0);
        println!("{}", chart.lineplot(&shape));
    }
}
