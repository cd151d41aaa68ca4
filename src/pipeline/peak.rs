//! Finding the maximum row of each group.

use crate::error::PipelineError;
use crate::model::{DimValue, Dimension};
use crate::pipeline::aggregate::{AggregateTable, AggregatedRow};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// For each distinct value of `group`, the row with the greatest metric value.
///
/// When several rows share the maximum, the one that appears first in the table wins. An empty
/// table yields an empty map.
pub fn peak_of(
    table: &AggregateTable,
    group: Dimension,
) -> Result<BTreeMap<DimValue, AggregatedRow>, PipelineError> {
    let ix = table.column(group)?;
    let mut peaks: BTreeMap<DimValue, AggregatedRow> = BTreeMap::new();
    for row in table.rows() {
        match peaks.entry(row.key[ix].clone()) {
            Entry::Vacant(e) => {
                e.insert(row.clone());
            }
            Entry::Occupied(mut e) => {
                if row.value > e.get().value {
                    e.insert(row.clone());
                }
            }
        }
    }
    Ok(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Metric, Month};
    use rust_decimal::Decimal;

    fn row(group: &str, month: Month, value: i64) -> AggregatedRow {
        AggregatedRow::new(
            vec![DimValue::Text(group.to_string()), DimValue::Month(month)],
            Decimal::from(value),
        )
    }

    fn table(rows: Vec<AggregatedRow>) -> AggregateTable {
        AggregateTable::new(
            vec![Dimension::Category, Dimension::Month],
            Metric::Profit,
            rows,
        )
    }

    #[test]
    fn test_peak_per_group() {
        let t = table(vec![
            row("A", Month::Jan, 50),
            row("A", Month::Feb, 90),
            row("B", Month::Jan, 70),
        ]);
        let peaks = peak_of(&t, Dimension::Category).unwrap();
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[&DimValue::Text("A".into())], row("A", Month::Feb, 90));
        assert_eq!(peaks[&DimValue::Text("B".into())], row("B", Month::Jan, 70));
    }

    #[test]
    fn test_ties_keep_first() {
        let t = table(vec![
            row("A", Month::Mar, 40),
            row("A", Month::Jan, 40),
            row("A", Month::Feb, -5),
        ]);
        let peaks = peak_of(&t, Dimension::Category).unwrap();
        assert_eq!(peaks[&DimValue::Text("A".into())], row("A", Month::Mar, 40));
    }

    #[test]
    fn test_negative_values() {
        let t = table(vec![row("A", Month::Jan, -30), row("A", Month::Feb, -10)]);
        let peaks = peak_of(&t, Dimension::Category).unwrap();
        assert_eq!(peaks[&DimValue::Text("A".into())].value, Decimal::from(-10));
    }

    #[test]
    fn test_empty_and_missing_column() {
        let t = table(Vec::new());
        assert!(peak_of(&t, Dimension::Category).unwrap().is_empty());
        assert!(peak_of(&t, Dimension::State).is_err());
    }
}
