use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use lotostat_engine::table::DisplayTable;

pub fn write_table<W: Write>(writer: W, table: &DisplayTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_table(path: &Path, table: &DisplayTable) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("Cannot create {:?}", path))?;
    write_table(file, table).with_context(|| format!("Cannot write table to {:?}", path))?;
    log::info!("Table written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_table_quotes_multi_digit_cells() {
        let table = DisplayTable {
            columns: vec!["0次".into(), "1次".into(), "期号".into()],
            rows: vec![vec!["q0, q3".into(), "q1$".into(), "4期".into()]],
        };
        let mut out = Vec::new();
        write_table(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "0次,1次,期号\n\"q0, q3\",q1$,4期\n");
    }
}
