//! Trailing moving-average smoothing of a time-indexed metric.

use crate::error::PipelineError;
use crate::model::{DimValue, Dimension};
use crate::pipeline::aggregate::AggregateTable;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Whether, and over how many periods, to smooth a series.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum SmoothingSpec {
    #[default]
    None,
    /// Trailing window of this many periods.
    Window(NonZeroUsize),
}

impl SmoothingSpec {
    /// `0` means no smoothing.
    pub fn from_window(window: usize) -> Self {
        NonZeroUsize::new(window)
            .map(SmoothingSpec::Window)
            .unwrap_or(SmoothingSpec::None)
    }
}

impl Display for SmoothingSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SmoothingSpec::None => f.write_str("none"),
            SmoothingSpec::Window(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for SmoothingSpec {
    type Err = String;

    /// Accepts `none` or a positive integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") {
            return Ok(SmoothingSpec::None);
        }
        s.parse::<NonZeroUsize>()
            .map(SmoothingSpec::Window)
            .map_err(|_| format!("'{s}' is not a smoothing window; use 'none' or a number >= 1"))
    }
}

impl Serialize for SmoothingSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Replaces the metric of every row with a trailing simple moving average.
///
/// Rows are partitioned by the `group` column (or treated as one series when `group` is
/// `None`), ordered by the `time` column within each partition, and averaged over the last
/// `window` points. The first points of a series average over what is available, so the first
/// value is unchanged. Row count and row positions are preserved; only values change.
pub fn smooth(
    table: &AggregateTable,
    spec: SmoothingSpec,
    group: Option<Dimension>,
    time: Dimension,
) -> Result<AggregateTable, PipelineError> {
    let time_ix = table.column(time)?;
    let group_ix = group.map(|d| table.column(d)).transpose()?;
    let window = match spec {
        SmoothingSpec::None => return Ok(table.clone()),
        SmoothingSpec::Window(n) => n.get(),
    };

    // Row indexes per group, in first-appearance order of the group.
    let mut series: Vec<(Option<&DimValue>, Vec<usize>)> = Vec::new();
    for (ix, row) in table.rows().iter().enumerate() {
        let g = group_ix.map(|gix| &row.key[gix]);
        match series.iter_mut().find(|(k, _)| *k == g) {
            Some((_, ixs)) => ixs.push(ix),
            None => series.push((g, vec![ix])),
        }
    }

    let rows = table.rows();
    let mut values: Vec<Decimal> = rows.iter().map(|r| r.value).collect();
    for (_, mut ixs) in series {
        ixs.sort_by(|&a, &b| rows[a].key[time_ix].cmp(&rows[b].key[time_ix]));
        for (pos, &row_ix) in ixs.iter().enumerate() {
            let start = (pos + 1).saturating_sub(window);
            let span = &ixs[start..=pos];
            let sum: Decimal = span.iter().map(|&i| rows[i].value).sum();
            values[row_ix] = sum / Decimal::from(span.len());
        }
    }

    let smoothed = rows
        .iter()
        .zip(values)
        .map(|(r, value)| {
            let mut r = r.clone();
            r.value = value;
            r
        })
        .collect();
    Ok(table.with_rows(smoothed))
}
