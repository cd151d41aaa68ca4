//! Writing an aggregate table as delimited text.

use crate::pipeline::aggregate::AggregateTable;
use crate::Result;
use anyhow::Context;
use std::io::Write;

/// Writes `table` as UTF-8 CSV: one header row (dimension headers, then the metric header) and
/// one line per row, with no index column. An empty table produces only the header row.
pub fn write_csv<W: Write>(table: &AggregateTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.headers())
        .context("Unable to write the CSV header")?;
    for row in table.rows() {
        let record = row
            .key
            .iter()
            .map(|v| v.to_string())
            .chain(std::iter::once(row.value.to_string()));
        wtr.write_record(record)
            .context("Unable to write a CSV row")?;
    }
    wtr.flush().context("Unable to flush CSV output")?;
    Ok(())
}

/// `write_csv` into a `String`.
pub fn to_csv_string(table: &AggregateTable) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not UTF-8")
}
