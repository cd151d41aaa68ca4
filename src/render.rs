//! Turning view results into text: a markdown table, CSV or JSON.

use crate::dashboard::{
    AnnualProfit, FilterOptions, MonthlyTrend, ProfitTable, Ranking, StateTotals, YearMonthSeries,
};
use crate::model::{Amount, Metric};
use crate::pipeline::AggregateTable;
use crate::Result;
use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The output format of a view.
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
pub enum OutputFormat {
    /// Markdown table with formatted amounts.
    #[default]
    Table,
    /// CSV with plain numbers, as written by exports.
    Csv,
    /// The full view result as JSON, including ordering hints and peaks.
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Rendered view output in the requested format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    Json(serde_json::Value),
    Table(String),
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({:?})", v),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rows::Table(s) => write!(f, "{}", s),
            Rows::Csv(s) => write!(f, "{}", s),
        }
    }
}

/// Something that can be laid out as a header row and data rows.
pub trait Tabular {
    fn headers(&self) -> Vec<String>;

    /// Cell text for every row. When `pretty` is set, money is formatted for people.
    fn cells(&self, pretty: bool) -> Vec<Vec<String>>;
}

/// Renders `value` in `format`.
pub fn render<T>(value: &T, format: OutputFormat) -> Result<Rows>
where
    T: Tabular + Serialize,
{
    Ok(match format {
        OutputFormat::Json => {
            Rows::Json(serde_json::to_value(value).context("Unable to serialize view to JSON")?)
        }
        OutputFormat::Csv => Rows::Csv(csv_text(value)?),
        OutputFormat::Table => Rows::Table(markdown_table(value)),
    })
}

fn csv_text<T: Tabular>(value: &T) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(value.headers())
        .context("Unable to write the CSV header")?;
    for row in value.cells(false) {
        wtr.write_record(row).context("Unable to write a CSV row")?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn markdown_table<T: Tabular>(value: &T) -> String {
    let headers = value.headers();
    let rows = value.cells(true);
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = line(&headers);
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("| {} |", rule.join(" | ")));
    for row in &rows {
        out.push('\n');
        out.push_str(&line(row));
    }
    out.push('\n');
    out
}

fn metric_cell(metric: Metric, value: rust_decimal::Decimal, pretty: bool) -> String {
    match (metric, pretty) {
        (Metric::Profit, true) => Amount::new(value).pretty(),
        _ => value.to_string(),
    }
}

impl Tabular for AggregateTable {
    fn headers(&self) -> Vec<String> {
        AggregateTable::headers(self)
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn cells(&self, pretty: bool) -> Vec<Vec<String>> {
        self.rows()
            .iter()
            .map(|r| {
                r.key
                    .iter()
                    .map(|k| k.to_string())
                    .chain(std::iter::once(metric_cell(self.metric(), r.value, pretty)))
                    .collect()
            })
            .collect()
    }
}

impl Tabular for StateTotals {
    fn headers(&self) -> Vec<String> {
        vec![
            "State".to_string(),
            "Code".to_string(),
            self.metric.header().to_string(),
        ]
    }

    fn cells(&self, pretty: bool) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.state.clone(),
                    r.code.to_string(),
                    metric_cell(self.metric, r.value, pretty),
                ]
            })
            .collect()
    }
}

macro_rules! tabular_via_table {
    ($($t:ty),+) => {
        $(
            impl Tabular for $t {
                fn headers(&self) -> Vec<String> {
                    Tabular::headers(&self.table)
                }

                fn cells(&self, pretty: bool) -> Vec<Vec<String>> {
                    self.table.cells(pretty)
                }
            }
        )+
    };
}

tabular_via_table!(AnnualProfit, MonthlyTrend, ProfitTable, Ranking, YearMonthSeries);

impl Tabular for FilterOptions {
    fn headers(&self) -> Vec<String> {
        vec!["Filter".to_string(), "Options".to_string()]
    }

    fn cells(&self, _pretty: bool) -> Vec<Vec<String>> {
        vec![
            vec!["Category".to_string(), self.categories.join(", ")],
            vec!["Sub-Category".to_string(), self.sub_categories.join(", ")],
            vec![
                "Year".to_string(),
                self.years
                    .iter()
                    .map(|y| y.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            ],
        ]
    }
}
