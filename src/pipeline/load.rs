//! Reading the input CSV and normalizing raw rows into `SalesRecord`s.

use crate::error::{DataFormatError, PipelineError};
use crate::model::schema::{PROFIT_STR, QUANTITY_STR, REQUIRED_COLUMNS, YEAR_MONTH_STR};
use crate::model::{parse_year_month, Amount, RawSalesRow, SalesRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, warn};

/// What to do with a row whose date, quantity or profit cannot be parsed.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BadRowPolicy {
    /// Drop the row, remember it in `Normalized::skipped` and log a warning.
    #[default]
    Skip,
    /// Fail the whole load with `DataFormatError::Unparseable`.
    Abort,
}

serde_plain::derive_display_from_serialize!(BadRowPolicy);
serde_plain::derive_fromstr_from_deserialize!(BadRowPolicy);

/// A row that was dropped during normalization.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, JsonSchema)]
pub struct SkippedRow {
    /// 1-based line in the file, counting the header line.
    pub line: u64,
    pub column: String,
    pub value: String,
}

/// The output of `load_and_normalize`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Normalized {
    pub records: Vec<SalesRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// The output of `read_raw_rows`: the rows that were read and the records that were too short
/// to form a row.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RawRows {
    pub rows: Vec<RawSalesRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Reads raw rows from CSV text. All six required headers must be present; other columns are
/// ignored. Cells are trimmed.
///
/// A record with fewer fields than the header is a bad row and is handled according to
/// `policy`, like a cell that cannot be parsed. I/O errors always fail.
pub fn read_raw_rows<R: Read>(
    reader: R,
    policy: BadRowPolicy,
) -> Result<RawRows, DataFormatError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|&&required| !headers.iter().any(|h| h == required))
    {
        return Err(DataFormatError::MissingColumn(missing.to_string()));
    }

    let mut raw = RawRows::default();
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let bad = SkippedRow {
                    line: e.position().map_or(0, |p| p.line()),
                    column: "record".to_string(),
                    value: e.to_string(),
                };
                handle_bad_row(bad, policy, &mut raw.skipped)?;
                continue;
            }
        };

        let line = record.position().map_or(0, |p| p.line());
        match record.deserialize::<RawSalesRow>(Some(&headers)) {
            Ok(row) => raw.rows.push(row.at_line(line)),
            Err(e) => {
                let bad = match first_absent_column(&headers, &record) {
                    Some(column) => SkippedRow {
                        line,
                        column: column.to_string(),
                        value: String::new(),
                    },
                    None => SkippedRow {
                        line,
                        column: "record".to_string(),
                        value: e.to_string(),
                    },
                };
                handle_bad_row(bad, policy, &mut raw.skipped)?;
            }
        }
    }
    Ok(raw)
}

/// The first required column that `record` has no field for.
fn first_absent_column(
    headers: &csv::StringRecord,
    record: &csv::StringRecord,
) -> Option<&'static str> {
    REQUIRED_COLUMNS.iter().copied().find(|&required| {
        headers
            .iter()
            .position(|h| h == required)
            .map_or(true, |ix| ix >= record.len())
    })
}

/// Parses dates, quantities and profits and derives the date parts of every row.
///
/// Output order equals input order and nothing is deduplicated. Rows that fail to parse are
/// handled according to `policy`. Rows without a line number are numbered as if each took one
/// line after a header line.
pub fn load_and_normalize<I>(rows: I, policy: BadRowPolicy) -> Result<Normalized, PipelineError>
where
    I: IntoIterator<Item = RawSalesRow>,
{
    let mut normalized = Normalized::default();
    for (ix, raw) in rows.into_iter().enumerate() {
        let line = raw.line.unwrap_or(ix as u64 + 2);
        match normalize_row(&raw, line) {
            Ok(record) => normalized.records.push(record),
            Err(skipped) => handle_bad_row(skipped, policy, &mut normalized.skipped)?,
        }
    }
    debug!(
        "Normalized {} records, skipped {}",
        normalized.records.len(),
        normalized.skipped.len()
    );
    Ok(normalized)
}

fn handle_bad_row(
    bad: SkippedRow,
    policy: BadRowPolicy,
    skipped: &mut Vec<SkippedRow>,
) -> Result<(), DataFormatError> {
    match policy {
        BadRowPolicy::Abort => Err(DataFormatError::Unparseable {
            line: bad.line,
            column: bad.column,
            value: bad.value,
        }),
        BadRowPolicy::Skip => {
            warn!(
                "Skipping line {}: unable to parse {} value '{}'",
                bad.line, bad.column, bad.value
            );
            skipped.push(bad);
            Ok(())
        }
    }
}

fn normalize_row(raw: &RawSalesRow, line: u64) -> Result<SalesRecord, SkippedRow> {
    let bad = |column: &str, value: &str| SkippedRow {
        line,
        column: column.to_string(),
        value: value.to_string(),
    };

    let date =
        parse_year_month(&raw.year_month).ok_or_else(|| bad(YEAR_MONTH_STR, &raw.year_month))?;
    let quantity = raw
        .quantity
        .trim()
        .parse::<u32>()
        .map_err(|_| bad(QUANTITY_STR, &raw.quantity))?;
    let profit = Amount::from_str(&raw.profit).map_err(|_| bad(PROFIT_STR, &raw.profit))?;

    Ok(SalesRecord::new(
        date,
        raw.category.as_str(),
        raw.sub_category.as_str(),
        raw.state.as_str(),
        quantity,
        profit.value(),
    ))
}
