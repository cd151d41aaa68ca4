//! Rotated export files in `$SALES_HOME/exports`.

use crate::pipeline::{write_csv, AggregateTable};
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;

/// Prefix for profit table exports.
pub const PROFIT_TABLE: &str = "profit-table";

const CSV: &str = "csv";

/// Writes export files and rotates old ones.
///
/// The `Exports` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::exporter()` or `Exports::new()`.
#[derive(Debug, Clone)]
pub struct Exports {
    exports_dir: PathBuf,
    export_copies: u32,
}

impl Exports {
    pub fn new(config: &Config) -> Self {
        Self {
            exports_dir: config.exports().to_path_buf(),
            export_copies: config.export_copies(),
        }
    }

    /// Writes `table` as CSV to `{prefix}.YYYY-MM-DD-NNN.csv`, where NNN is a sequence number,
    /// then deletes the oldest files so that at most `export_copies` (and at least one) remain
    /// for `prefix`.
    ///
    /// Returns the path to the created file.
    pub async fn save_csv(&self, prefix: &str, table: &AggregateTable) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, date).await?;
        let filename = format!("{prefix}.{}-{seq:03}.{CSV}", date.format(DATE_FORMAT));
        let path = self.exports_dir.join(&filename);

        let mut buf = Vec::new();
        write_csv(table, &mut buf).context("Failed to render the export")?;
        utils::write(&path, buf).await?;

        self.rotate(prefix).await?;

        Ok(path)
    }

    /// Scans the exports directory for existing files with the given prefix and date, and
    /// returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: NaiveDate) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.exports_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some((file_date, seq)) = parse_export_name(&name, prefix) {
                if file_date == date {
                    max_seq = max_seq.max(seq);
                }
            }
        }

        Ok(max_seq + 1)
    }

    /// Keeps only the newest `export_copies` files with the given prefix, ordered by date and
    /// then sequence number. The newest file is always kept.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<((NaiveDate, u32), PathBuf)> = Vec::new();

        let mut dir = utils::read_dir(&self.exports_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(order) = parse_export_name(&name, prefix) {
                files.push((order, entry.path()));
            }
        }
        files.sort_by_key(|(order, _)| *order);

        let keep = self.export_copies.max(1) as usize;
        let to_delete = files.len().saturating_sub(keep);
        for (_, path) in files.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses `{prefix}.YYYY-MM-DD-NNN.csv` into its date and sequence number.
fn parse_export_name(filename: &str, prefix: &str) -> Option<(NaiveDate, u32)> {
    let stem = filename
        .strip_prefix(prefix)?
        .strip_prefix('.')?
        .strip_suffix(CSV)?
        .strip_suffix('.')?;
    let (date, seq) = stem.rsplit_once('-')?;
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    Some((date, seq.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimension, Metric};
    use crate::pipeline::AggregationSpec;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_export_name() {
        assert_eq!(
            parse_export_name("profit-table.2025-12-14-001.csv", PROFIT_TABLE),
            Some((ymd(2025, 12, 14), 1))
        );
        assert_eq!(
            parse_export_name("profit-table.2025-12-14-1000.csv", PROFIT_TABLE),
            Some((ymd(2025, 12, 14), 1000))
        );
        assert_eq!(
            parse_export_name("profit-table.2025-12-14-001.json", PROFIT_TABLE),
            None
        );
        assert_eq!(
            parse_export_name("ranking.2025-12-14-001.csv", PROFIT_TABLE),
            None
        );
        assert_eq!(
            parse_export_name("profit-tables.2025-12-14-001.csv", PROFIT_TABLE),
            None
        );
        assert_eq!(
            parse_export_name("profit-table.yesterday-001.csv", PROFIT_TABLE),
            None
        );
    }

    #[tokio::test]
    async fn test_save_and_rotate() {
        let dir = TempDir::new().unwrap();
        let exports = Exports {
            exports_dir: dir.path().to_path_buf(),
            export_copies: 2,
        };
        let spec = AggregationSpec::new([Dimension::Year], Metric::Profit).unwrap();
        let table = AggregateTable::empty(&spec);

        let first = exports.save_csv(PROFIT_TABLE, &table).await.unwrap();
        let second = exports.save_csv(PROFIT_TABLE, &table).await.unwrap();
        let third = exports.save_csv(PROFIT_TABLE, &table).await.unwrap();

        assert!(first.to_string_lossy().ends_with("-001.csv"));
        assert!(third.to_string_lossy().ends_with("-003.csv"));
        assert!(!first.exists());
        assert!(second.exists());
        assert_eq!(utils::read(&third).await.unwrap(), "Year,Profit\n");
    }

    #[tokio::test]
    async fn test_rotate_orders_by_date_then_number() {
        let dir = TempDir::new().unwrap();
        let exports = Exports {
            exports_dir: dir.path().to_path_buf(),
            export_copies: 2,
        };
        let today = today().format(DATE_FORMAT).to_string();
        let old = dir.path().join("profit-table.2020-01-01-005.csv");
        let nine = dir.path().join(format!("profit-table.{today}-999.csv"));
        let thousand = dir.path().join(format!("profit-table.{today}-1000.csv"));
        for path in [&old, &nine, &thousand] {
            utils::write(path, "Year,Profit\n").await.unwrap();
        }

        let spec = AggregationSpec::new([Dimension::Year], Metric::Profit).unwrap();
        let newest = exports
            .save_csv(PROFIT_TABLE, &AggregateTable::empty(&spec))
            .await
            .unwrap();

        assert!(newest.to_string_lossy().ends_with("-1001.csv"));
        assert!(newest.exists());
        assert!(thousand.exists());
        assert!(!nine.exists());
        assert!(!old.exists());
    }

    #[tokio::test]
    async fn test_zero_copies_keeps_the_new_export() {
        let dir = TempDir::new().unwrap();
        let exports = Exports {
            exports_dir: dir.path().to_path_buf(),
            export_copies: 0,
        };
        let spec = AggregationSpec::new([Dimension::Year], Metric::Profit).unwrap();
        let table = AggregateTable::empty(&spec);

        let first = exports.save_csv(PROFIT_TABLE, &table).await.unwrap();
        let second = exports.save_csv(PROFIT_TABLE, &table).await.unwrap();
        assert!(!first.exists());
        assert!(second.exists());
    }
}
