//! Shared test utilities for building records and test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::commands::Session;
use crate::model::SalesRecord;
use crate::Config;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use tempfile::TempDir;

/// The same rows as `sample()`, as the input file would hold them.
pub(crate) const SAMPLE_CSV: &str = "\
Year-Month,Category,Sub-Category,State,Quantity,Profit
2022-01,Furniture,Chairs,Texas,2,100
2023-02,Technology,Phones,Ohio,1,50
2023-03,Furniture,Tables,Ohio,4,-20
2022-03,Office Supplies,Paper,Texas,9,15
2023-01,Furniture,Chairs,New York,3,70
2023-02,Technology,Machines,Texas,1,300
";

pub(crate) fn record(
    year: i32,
    month: u32,
    category: &str,
    sub_category: &str,
    state: &str,
    quantity: u32,
    profit: i64,
) -> SalesRecord {
    SalesRecord::new(
        NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
        category,
        sub_category,
        state,
        quantity,
        Decimal::from(profit),
    )
}

/// Six records over two years, three categories and three states.
pub(crate) fn sample() -> Vec<SalesRecord> {
    vec![
        record(2022, 1, "Furniture", "Chairs", "Texas", 2, 100),
        record(2023, 2, "Technology", "Phones", "Ohio", 1, 50),
        record(2023, 3, "Furniture", "Tables", "Ohio", 4, -20),
        record(2022, 3, "Office Supplies", "Paper", "Texas", 9, 15),
        record(2023, 1, "Furniture", "Chairs", "New York", 3, 70),
        record(2023, 2, "Technology", "Machines", "Texas", 1, 300),
    ]
}

/// Test environment with a sales home directory, a Config and a data file holding `SAMPLE_CSV`.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let data_file = temp_dir.path().join("Sales Dataset.csv");
        std::fs::write(&data_file, SAMPLE_CSV).unwrap();

        let root = temp_dir.path().join("sales");
        let config = Config::create(&root, &data_file).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// A fresh session over the configured data file.
    pub fn session(&self) -> Session {
        Session::new(self.config(), None)
    }
}
