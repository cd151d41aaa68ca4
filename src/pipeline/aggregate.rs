//! Grouping records and summing a metric.

use crate::error::PipelineError;
use crate::model::{DimValue, Dimension, Metric, SalesRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Which dimensions to group by, in order, and which metric to sum.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AggregationSpec {
    dimensions: Vec<Dimension>,
    metric: Metric,
}

impl AggregationSpec {
    /// Fails if a dimension is listed twice.
    pub fn new(
        dimensions: impl IntoIterator<Item = Dimension>,
        metric: Metric,
    ) -> Result<Self, PipelineError> {
        let dimensions: Vec<Dimension> = dimensions.into_iter().collect();
        for (ix, d) in dimensions.iter().enumerate() {
            if dimensions[..ix].contains(d) {
                return Err(PipelineError::invalid_spec(format!(
                    "dimension '{d}' is listed more than once"
                )));
            }
        }
        Ok(Self { dimensions, metric })
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }
}

/// One group: its key (one value per dimension, in spec order) and the summed metric.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub key: Vec<DimValue>,
    pub value: Decimal,
}

impl AggregatedRow {
    pub fn new(key: Vec<DimValue>, value: Decimal) -> Self {
        Self { key, value }
    }
}

/// The result of an aggregation. Columns are `dimensions` followed by `metric`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AggregateTable {
    dimensions: Vec<Dimension>,
    metric: Metric,
    rows: Vec<AggregatedRow>,
}

impl AggregateTable {
    pub fn new(dimensions: Vec<Dimension>, metric: Metric, rows: Vec<AggregatedRow>) -> Self {
        Self {
            dimensions,
            metric,
            rows,
        }
    }

    /// A table with the given columns and no rows.
    pub fn empty(spec: &AggregationSpec) -> Self {
        Self::new(spec.dimensions.clone(), spec.metric, Vec::new())
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn rows(&self) -> &[AggregatedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AggregatedRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.rows.iter().map(|r| r.value).sum()
    }

    /// The position of `dimension` within each row key.
    pub fn column(&self, dimension: Dimension) -> Result<usize, PipelineError> {
        self.dimensions
            .iter()
            .position(|d| *d == dimension)
            .ok_or_else(|| {
                PipelineError::invalid_spec(format!(
                    "the table has no '{dimension}' column (columns: {})",
                    self.dimensions
                        .iter()
                        .map(|d| d.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    /// Column headers in export order.
    pub fn headers(&self) -> Vec<&'static str> {
        self.dimensions
            .iter()
            .map(|d| d.header())
            .chain(std::iter::once(self.metric.header()))
            .collect()
    }

    pub(crate) fn with_rows(&self, rows: Vec<AggregatedRow>) -> Self {
        Self::new(self.dimensions.clone(), self.metric, rows)
    }
}

/// Groups `records` by the ordered tuple of `spec.dimensions()` and sums `spec.metric()`.
///
/// Grouping uses exact equality (text is case-sensitive). Each key appears once. Rows come out
/// in the order their key first appears in the input; callers that need another order sort
/// explicitly.
pub fn aggregate(records: &[SalesRecord], spec: &AggregationSpec) -> AggregateTable {
    let mut index: HashMap<Vec<DimValue>, usize> = HashMap::new();
    let mut rows: Vec<AggregatedRow> = Vec::new();

    for record in records {
        let key: Vec<DimValue> = spec
            .dimensions
            .iter()
            .map(|d| record.dim_value(*d))
            .collect();
        let value = record.metric(spec.metric);
        match index.get(&key) {
            Some(&ix) => rows[ix].value += value,
            None => {
                index.insert(key.clone(), rows.len());
                rows.push(AggregatedRow::new(key, value));
            }
        }
    }

    AggregateTable::new(spec.dimensions.clone(), spec.metric, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Month;
    use crate::test::sample;
    use std::collections::HashSet;

    fn text(s: &str) -> DimValue {
        DimValue::Text(s.to_string())
    }

    #[test]
    fn test_keys_unique_and_total_conserved() {
        let records = sample();
        for dims in [
            vec![Dimension::Category],
            vec![Dimension::Year, Dimension::Category],
            vec![Dimension::Month, Dimension::SubCategory, Dimension::State],
            vec![],
        ] {
            for metric in [Metric::Profit, Metric::Quantity] {
                let spec = AggregationSpec::new(dims.clone(), metric).unwrap();
                let table = aggregate(&records, &spec);
                let keys: HashSet<&Vec<DimValue>> = table.rows().iter().map(|r| &r.key).collect();
                assert_eq!(keys.len(), table.len());
                let input_total: Decimal = records.iter().map(|r| r.metric(metric)).sum();
                assert_eq!(table.total(), input_total);
            }
        }
    }

    #[test]
    fn test_first_appearance_order() {
        let table = aggregate(
            &sample(),
            &AggregationSpec::new([Dimension::Category], Metric::Profit).unwrap(),
        );
        let keys: Vec<String> = table.rows().iter().map(|r| r.key[0].to_string()).collect();
        assert_eq!(keys, vec!["Furniture", "Technology", "Office Supplies"]);
        assert_eq!(table.rows()[0].value, Decimal::from(150));
        assert_eq!(table.rows()[1].value, Decimal::from(350));
    }

    #[test]
    fn test_multi_dimension_key() {
        let table = aggregate(
            &sample(),
            &AggregationSpec::new([Dimension::Month, Dimension::Category], Metric::Quantity)
                .unwrap(),
        );
        let feb_tech = table
            .rows()
            .iter()
            .find(|r| r.key == vec![DimValue::Month(Month::Feb), text("Technology")])
            .unwrap();
        assert_eq!(feb_tech.value, Decimal::from(2));
    }

    #[test]
    fn test_empty_input() {
        let spec = AggregationSpec::new([Dimension::State], Metric::Profit).unwrap();
        let table = aggregate(&[], &spec);
        assert!(table.is_empty());
        assert_eq!(table, AggregateTable::empty(&spec));
        assert_eq!(table.headers(), vec!["State", "Profit"]);
    }

    #[test]
    fn test_duplicate_dimension_rejected() {
        let err = AggregationSpec::new([Dimension::Year, Dimension::Year], Metric::Profit)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidAggregationSpec(_)));
    }

    #[test]
    fn test_missing_column() {
        let table = aggregate(
            &sample(),
            &AggregationSpec::new([Dimension::Year], Metric::Profit).unwrap(),
        );
        assert_eq!(table.column(Dimension::Year).unwrap(), 0);
        assert!(table.column(Dimension::Month).is_err());
    }
}
