//! The fixed dashboard views, each one a composition of pipeline steps.
//!
//! Every view filters first. When filtering yields nothing, the view still succeeds: it returns
//! an empty table with the right columns and sets `empty` to the reason, so that front-ends can
//! show a "no data" state and exports can still be written.

use crate::error::PipelineError;
use crate::model::{state_code, DimValue, Dimension, Metric, SalesRecord};
use crate::pipeline::{
    aggregate, apply_filters, order_by, order_by_metric_total, order_months, peak_of, smooth,
    AggregateTable, AggregatedRow, AggregationSpec, EmptyReason, FilterCriteria, Filtered,
    Selection, SmoothingSpec,
};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// How a line chart should connect its points. Passed through to the renderer untouched.
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
pub enum LineShape {
    #[default]
    Linear,
    Spline,
}

serde_plain::derive_display_from_serialize!(LineShape);
serde_plain::derive_fromstr_from_deserialize!(LineShape);

/// Rendering hints for line charts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LineStyle {
    #[serde(default)]
    pub line_shape: LineShape,
    #[serde(default)]
    pub markers: bool,
}

/// Filters and aggregates in one step, substituting an empty table when filtering yields nothing.
fn filtered_aggregate(
    records: &[SalesRecord],
    criteria: &FilterCriteria,
    spec: &AggregationSpec,
) -> (AggregateTable, Option<EmptyReason>) {
    match apply_filters(records, criteria) {
        Filtered::Rows(rows) => {
            let table = aggregate(&rows, spec);
            debug!(
                "Aggregated {} records into {} rows by {:?}",
                rows.len(),
                table.len(),
                spec.dimensions()
            );
            (table, None)
        }
        Filtered::Empty(reason) => {
            warn!("{reason}");
            (AggregateTable::empty(spec), Some(reason))
        }
    }
}

// =============================================================================
// State totals (choropleth data)
// =============================================================================

/// One state's total, with its USPS code for map rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTotal {
    pub state: String,
    pub code: &'static str,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateTotals {
    pub metric: Metric,
    pub rows: Vec<StateTotal>,
    /// State names in the data that have no USPS code and were left off the map.
    pub unmapped: Vec<String>,
    pub empty: Option<EmptyReason>,
}

/// Totals of `metric` per state, ordered by state name.
pub fn state_totals(
    records: &[SalesRecord],
    criteria: &FilterCriteria,
    metric: Metric,
) -> Result<StateTotals, PipelineError> {
    let spec = AggregationSpec::new([Dimension::State], metric)?;
    let (table, empty) = filtered_aggregate(records, criteria, &spec);
    let table = order_by(&table, &[Dimension::State])?;

    let mut rows = Vec::new();
    let mut unmapped = Vec::new();
    for row in table.into_rows() {
        let state = row.key[0].to_string();
        match state_code(&state) {
            Some(code) => rows.push(StateTotal {
                state,
                code,
                value: row.value,
            }),
            None => unmapped.push(state),
        }
    }
    if !unmapped.is_empty() {
        warn!(
            "{} state name(s) have no state code and are not mapped: {}",
            unmapped.len(),
            unmapped.join(", ")
        );
    }
    Ok(StateTotals {
        metric,
        rows,
        unmapped,
        empty,
    })
}

// =============================================================================
// Annual profit by category (grouped bars)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AnnualProfit {
    /// Year x Category profit, ordered by year.
    pub table: AggregateTable,
    /// The x axis: years in ascending order.
    pub year_order: Vec<i32>,
    /// The bar grouping: categories ordered by their total profit.
    pub category_order: Vec<String>,
    pub empty: Option<EmptyReason>,
}

pub fn annual_profit(
    records: &[SalesRecord],
    criteria: &FilterCriteria,
    ascending: bool,
) -> Result<AnnualProfit, PipelineError> {
    let spec = AggregationSpec::new([Dimension::Year, Dimension::Category], Metric::Profit)?;
    let (table, empty) = filtered_aggregate(records, criteria, &spec);
    let table = order_by(&table, &[Dimension::Year])?;

    let year_order: BTreeSet<i32> = table
        .rows()
        .iter()
        .filter_map(|r| match r.key[0] {
            DimValue::Year(y) => Some(y),
            _ => None,
        })
        .collect();
    let category_order = order_by_metric_total(&table, Dimension::Category, ascending)?
        .into_iter()
        .map(|v| v.to_string())
        .collect();

    Ok(AnnualProfit {
        table,
        year_order: year_order.into_iter().collect(),
        category_order,
        empty,
    })
}

// =============================================================================
// Monthly profit trend (line chart)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrend {
    /// The series dimension: `Category`, or `SubCategory` when sub-categories are restricted.
    pub group: Dimension,
    /// Month x group profit in calendar order, smoothed if requested.
    pub table: AggregateTable,
    pub smoothing: SmoothingSpec,
    /// The highest point of each series.
    pub peaks: Vec<AggregatedRow>,
    pub style: LineStyle,
    pub empty: Option<EmptyReason>,
}

pub fn monthly_trend(
    records: &[SalesRecord],
    criteria: &FilterCriteria,
    smoothing: SmoothingSpec,
    style: LineStyle,
) -> Result<MonthlyTrend, PipelineError> {
    let group = if criteria.restricts_sub_categories() {
        Dimension::SubCategory
    } else {
        Dimension::Category
    };
    let spec = AggregationSpec::new([Dimension::Month, group], Metric::Profit)?;
    let (table, empty) = filtered_aggregate(records, criteria, &spec);
    let table = order_months(&table, Dimension::Month, Some(group))?;
    let table = smooth(&table, smoothing, Some(group), Dimension::Month)?;
    let peaks = peak_of(&table, group)?.into_values().collect();

    Ok(MonthlyTrend {
        group,
        table,
        smoothing,
        peaks,
        style,
        empty,
    })
}

// =============================================================================
// Profit data table (exportable)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProfitTable {
    /// Year x Month x Category x Sub-Category profit, ordered by year then month.
    pub table: AggregateTable,
    pub empty: Option<EmptyReason>,
}

pub fn profit_table(
    records: &[SalesRecord],
    criteria: &FilterCriteria,
) -> Result<ProfitTable, PipelineError> {
    let spec = AggregationSpec::new(
        [
            Dimension::Year,
            Dimension::Month,
            Dimension::Category,
            Dimension::SubCategory,
        ],
        Metric::Profit,
    )?;
    let (table, empty) = filtered_aggregate(records, criteria, &spec);
    let table = order_by(&table, &[Dimension::Year, Dimension::Month])?;
    Ok(ProfitTable { table, empty })
}

// =============================================================================
// Ranking (bars ordered by total)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub key: Dimension,
    /// One row per key value, in `order`.
    pub table: AggregateTable,
    /// Key values ordered by total.
    pub order: Vec<DimValue>,
    pub ascending: bool,
    pub empty: Option<EmptyReason>,
}

pub fn ranking(
    records: &[SalesRecord],
    criteria: &FilterCriteria,
    key: Dimension,
    metric: Metric,
    ascending: bool,
) -> Result<Ranking, PipelineError> {
    let spec = AggregationSpec::new([key], metric)?;
    let (table, empty) = filtered_aggregate(records, criteria, &spec);
    let order = order_by_metric_total(&table, key, ascending)?;

    let mut rows = table.rows().to_vec();
    rows.sort_by_key(|r| order.iter().position(|k| *k == r.key[0]));
    let table = AggregateTable::new(vec![key], metric, rows);

    Ok(Ranking {
        key,
        table,
        order,
        ascending,
        empty,
    })
}

// =============================================================================
// Year-Month series (single line chart)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct YearMonthSeries {
    pub split: Option<Dimension>,
    /// Year-Month (x split) profit in chronological order, smoothed if requested.
    pub table: AggregateTable,
    pub smoothing: SmoothingSpec,
    /// The highest point of each series; a single row when there is no split.
    pub peaks: Vec<AggregatedRow>,
    pub empty: Option<EmptyReason>,
}

pub fn year_month_series(
    records: &[SalesRecord],
    criteria: &FilterCriteria,
    split: Option<Dimension>,
    smoothing: SmoothingSpec,
) -> Result<YearMonthSeries, PipelineError> {
    let dimensions: Vec<Dimension> = std::iter::once(Dimension::YearMonth).chain(split).collect();
    let spec = AggregationSpec::new(dimensions.clone(), Metric::Profit)?;
    let (table, empty) = filtered_aggregate(records, criteria, &spec);
    let table = order_by(&table, &dimensions)?;
    let table = smooth(&table, smoothing, split, Dimension::YearMonth)?;

    let peaks = match split {
        Some(group) => peak_of(&table, group)?.into_values().collect(),
        None => overall_peak(&table).into_iter().collect(),
    };

    Ok(YearMonthSeries {
        split,
        table,
        smoothing,
        peaks,
        empty,
    })
}

/// The first row with the greatest value.
fn overall_peak(table: &AggregateTable) -> Option<AggregatedRow> {
    table
        .rows()
        .iter()
        .fold(None, |best: Option<&AggregatedRow>, row| match best {
            Some(b) if b.value >= row.value => Some(b),
            _ => Some(row),
        })
        .cloned()
}

// =============================================================================
// Filter options (dependent drop-downs)
// =============================================================================

/// The values a user can choose from, each sorted and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    /// Only the sub-categories that belong to the chosen categories.
    pub sub_categories: Vec<String>,
    pub years: Vec<i32>,
}

pub fn filter_options(records: &[SalesRecord], categories: &Selection<String>) -> FilterOptions {
    let mut all_categories = BTreeSet::new();
    let mut sub_categories = BTreeSet::new();
    let mut years = BTreeSet::new();
    for r in records {
        all_categories.insert(r.category());
        years.insert(r.year());
        let chosen = match categories {
            Selection::All => true,
            Selection::Only(c) => c.iter().any(|c| c == r.category()),
        };
        if chosen {
            sub_categories.insert(r.sub_category());
        }
    }
    FilterOptions {
        categories: all_categories.into_iter().map(String::from).collect(),
        sub_categories: sub_categories.into_iter().map(String::from).collect(),
        years: years.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Month;
    use crate::pipeline::{EmptySelectionPolicy, ALL};
    use crate::test::{record, sample};

    fn everything() -> FilterCriteria {
        FilterCriteria::default()
    }

    fn categories(cats: &[&str]) -> FilterCriteria {
        FilterCriteria {
            categories: Selection::from_choices(cats),
            ..Default::default()
        }
    }

    #[test]
    fn test_state_totals() {
        let mut records = sample();
        records.push(record(2023, 5, "Furniture", "Chairs", "Atlantis", 1, 5));
        let totals = state_totals(&records, &everything(), Metric::Quantity).unwrap();
        let states: Vec<(&str, &str, Decimal)> = totals
            .rows
            .iter()
            .map(|r| (r.state.as_str(), r.code, r.value))
            .collect();
        assert_eq!(
            states,
            vec![
                ("New York", "NY", Decimal::from(3)),
                ("Ohio", "OH", Decimal::from(5)),
                ("Texas", "TX", Decimal::from(12)),
            ]
        );
        assert_eq!(totals.unmapped, vec!["Atlantis"]);
        assert!(totals.empty.is_none());
    }

    #[test]
    fn test_annual_profit() {
        let annual = annual_profit(&sample(), &everything(), false).unwrap();
        assert_eq!(annual.year_order, vec![2022, 2023]);
        assert_eq!(
            annual.category_order,
            vec!["Technology", "Furniture", "Office Supplies"]
        );
        assert_eq!(annual.table.total(), Decimal::from(515));
        assert_eq!(annual.table.rows()[0].key[0], DimValue::Year(2022));
    }

    #[test]
    fn test_monthly_trend_groups_by_category() {
        let trend = monthly_trend(
            &sample(),
            &everything(),
            SmoothingSpec::None,
            LineStyle::default(),
        )
        .unwrap();
        assert_eq!(trend.group, Dimension::Category);
        let months: Vec<Month> = trend
            .table
            .rows()
            .iter()
            .filter_map(|r| r.key[0].as_month())
            .collect();
        let mut sorted = months.clone();
        sorted.sort();
        assert_eq!(months, sorted);

        let furniture_peak = trend
            .peaks
            .iter()
            .find(|r| r.key[1] == DimValue::Text("Furniture".into()))
            .unwrap();
        // Jan: 100 + 70
        assert_eq!(furniture_peak.key[0], DimValue::Month(Month::Jan));
        assert_eq!(furniture_peak.value, Decimal::from(170));
    }

    #[test]
    fn test_monthly_trend_groups_by_sub_category_and_smooths() {
        let criteria = FilterCriteria {
            categories: Selection::from_choices(&["Furniture"]),
            sub_categories: Selection::from_choices(&["Chairs", "Tables"]),
            ..Default::default()
        };
        let style = LineStyle {
            line_shape: LineShape::Spline,
            markers: true,
        };
        let trend = monthly_trend(&sample(), &criteria, SmoothingSpec::from_window(3), style)
            .unwrap();
        assert_eq!(trend.group, Dimension::SubCategory);
        assert_eq!(trend.style, style);
        assert_eq!(trend.table.len(), 2);
        assert_eq!(trend.table.total(), Decimal::from(150));
    }

    #[test]
    fn test_monthly_trend_empty_sub_categories_under_all_policy() {
        let criteria = FilterCriteria {
            sub_categories: Selection::Only(Vec::new()),
            empty_selection: EmptySelectionPolicy::All,
            ..Default::default()
        };
        let trend =
            monthly_trend(&sample(), &criteria, SmoothingSpec::None, LineStyle::default()).unwrap();
        assert_eq!(trend.group, Dimension::Category);
        assert!(trend.empty.is_none());
    }

    #[test]
    fn test_empty_selection_yields_empty_report() {
        let criteria = FilterCriteria {
            years: Selection::Only(Vec::new()),
            ..Default::default()
        };
        let table = profit_table(&sample(), &criteria).unwrap();
        assert!(table.table.is_empty());
        assert_eq!(
            table.empty,
            Some(EmptyReason::NothingSelected(Dimension::Year))
        );
        assert_eq!(
            table.table.headers(),
            vec!["Year", "Month", "Category", "Sub-Category", "Profit"]
        );

        let lenient = FilterCriteria {
            empty_selection: EmptySelectionPolicy::All,
            ..criteria
        };
        assert!(profit_table(&sample(), &lenient).unwrap().empty.is_none());
    }

    #[test]
    fn test_profit_table_order() {
        let table = profit_table(&sample(), &categories(&[ALL])).unwrap().table;
        let keys: Vec<(String, String)> = table
            .rows()
            .iter()
            .map(|r| (r.key[0].to_string(), r.key[1].to_string()))
            .collect();
        assert_eq!(keys[0], ("2022".to_string(), "Jan".to_string()));
        assert_eq!(keys[1], ("2022".to_string(), "Mar".to_string()));
        assert_eq!(keys[2], ("2023".to_string(), "Jan".to_string()));
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn test_ranking() {
        let ranked = ranking(
            &sample(),
            &everything(),
            Dimension::SubCategory,
            Metric::Profit,
            false,
        )
        .unwrap();
        let keys: Vec<String> = ranked.order.iter().map(|k| k.to_string()).collect();
        assert_eq!(keys[0], "Machines");
        assert_eq!(keys.last().unwrap(), "Tables");
        let table_keys: Vec<String> = ranked
            .table
            .rows()
            .iter()
            .map(|r| r.key[0].to_string())
            .collect();
        assert_eq!(table_keys, keys);
    }

    #[test]
    fn test_year_month_series() {
        let series = year_month_series(
            &sample(),
            &categories(&["Furniture", "Technology"]),
            None,
            SmoothingSpec::None,
        )
        .unwrap();
        let labels: Vec<String> = series
            .table
            .rows()
            .iter()
            .map(|r| r.key[0].to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["2022-Jan", "2023-Jan", "2023-Feb", "2023-Mar"]
        );
        assert_eq!(series.peaks.len(), 1);
        assert_eq!(series.peaks[0].value, Decimal::from(350));

        let split = year_month_series(
            &sample(),
            &everything(),
            Some(Dimension::Category),
            SmoothingSpec::from_window(2),
        )
        .unwrap();
        assert_eq!(split.peaks.len(), 3);
    }

    #[test]
    fn test_year_month_series_rejects_duplicate_split() {
        let err = year_month_series(
            &sample(),
            &everything(),
            Some(Dimension::YearMonth),
            SmoothingSpec::None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidAggregationSpec(_)));
    }

    #[test]
    fn test_filter_options() {
        let options = filter_options(&sample(), &Selection::from_choices(&["Technology"]));
        assert_eq!(
            options.categories,
            vec!["Furniture", "Office Supplies", "Technology"]
        );
        assert_eq!(options.sub_categories, vec!["Machines", "Phones"]);
        assert_eq!(options.years, vec![2022, 2023]);

        let all = filter_options(&sample(), &Selection::All);
        assert_eq!(all.sub_categories.len(), 5);
    }
}
