//! Explicit sort passes over aggregated tables.

use crate::error::PipelineError;
use crate::model::{DimValue, Dimension};
use crate::pipeline::aggregate::AggregateTable;
use rust_decimal::Decimal;

/// Sorts rows by calendar month (Jan..Dec) in the `month` column.
///
/// The sort is stable. When `secondary` is given, rows in the same month are ordered by that
/// column; otherwise they keep their relative input order. Idempotent.
pub fn order_months(
    table: &AggregateTable,
    month: Dimension,
    secondary: Option<Dimension>,
) -> Result<AggregateTable, PipelineError> {
    let month_ix = table.column(month)?;
    if let Some(row) = table.rows().first() {
        if row.key[month_ix].as_month().is_none() {
            return Err(PipelineError::invalid_spec(format!(
                "'{month}' is not a month column"
            )));
        }
    }
    let secondary_ix = secondary.map(|d| table.column(d)).transpose()?;

    let mut rows = table.rows().to_vec();
    rows.sort_by(|a, b| {
        let by_month = a.key[month_ix].as_month().cmp(&b.key[month_ix].as_month());
        match secondary_ix {
            Some(ix) => by_month.then_with(|| a.key[ix].cmp(&b.key[ix])),
            None => by_month,
        }
    });
    Ok(table.with_rows(rows))
}

/// Stable lexicographic sort on the listed columns using natural value order: years
/// numerically, months by calendar, year-months chronologically and text lexically.
pub fn order_by(
    table: &AggregateTable,
    columns: &[Dimension],
) -> Result<AggregateTable, PipelineError> {
    let ixs = columns
        .iter()
        .map(|d| table.column(*d))
        .collect::<Result<Vec<usize>, _>>()?;

    let mut rows = table.rows().to_vec();
    rows.sort_by(|a, b| {
        ixs.iter()
            .map(|&ix| a.key[ix].cmp(&b.key[ix]))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(table.with_rows(rows))
}

/// Totals the table's metric per distinct value of `key` and returns those values sorted by
/// total. Ties keep the order in which the values first appear. The result is meant to be used
/// as a categorical axis order; the table itself is not changed.
pub fn order_by_metric_total(
    table: &AggregateTable,
    key: Dimension,
    ascending: bool,
) -> Result<Vec<DimValue>, PipelineError> {
    let ix = table.column(key)?;

    let mut totals: Vec<(DimValue, Decimal)> = Vec::new();
    for row in table.rows() {
        let value = &row.key[ix];
        match totals.iter_mut().find(|(k, _)| k == value) {
            Some((_, total)) => *total += row.value,
            None => totals.push((value.clone(), row.value)),
        }
    }

    // sort_by is stable, so equal totals keep first-appearance order
    if ascending {
        totals.sort_by(|a, b| a.1.cmp(&b.1));
    } else {
        totals.sort_by(|a, b| b.1.cmp(&a.1));
    }
    Ok(totals.into_iter().map(|(k, _)| k).collect())
}
