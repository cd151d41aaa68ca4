//! Column names of the input file and the dimensions and metrics that can be grouped and summed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub(crate) const YEAR_MONTH_STR: &str = "Year-Month";
pub(crate) const CATEGORY_STR: &str = "Category";
pub(crate) const SUB_CATEGORY_STR: &str = "Sub-Category";
pub(crate) const STATE_STR: &str = "State";
pub(crate) const QUANTITY_STR: &str = "Quantity";
pub(crate) const PROFIT_STR: &str = "Profit";
pub(crate) const YEAR_STR: &str = "Year";
pub(crate) const MONTH_STR: &str = "Month";

/// The headers that must be present in the input file.
pub(crate) const REQUIRED_COLUMNS: [&str; 6] = [
    YEAR_MONTH_STR,
    CATEGORY_STR,
    SUB_CATEGORY_STR,
    STATE_STR,
    QUANTITY_STR,
    PROFIT_STR,
];

/// A field that records can be grouped by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    /// Calendar year, e.g. 2023.
    Year,
    /// Month of the year, Jan..Dec, regardless of year.
    Month,
    /// A specific month of a specific year, e.g. 2023-Mar.
    YearMonth,
    /// Product category.
    Category,
    /// Product sub-category.
    SubCategory,
    /// Full U.S. state name.
    State,
}

serde_plain::derive_display_from_serialize!(Dimension);
serde_plain::derive_fromstr_from_deserialize!(Dimension);

impl Dimension {
    /// The column header used in exports.
    pub fn header(&self) -> &'static str {
        match self {
            Dimension::Year => YEAR_STR,
            Dimension::Month => MONTH_STR,
            Dimension::YearMonth => YEAR_MONTH_STR,
            Dimension::Category => CATEGORY_STR,
            Dimension::SubCategory => SUB_CATEGORY_STR,
            Dimension::State => STATE_STR,
        }
    }
}

/// A numeric field that is summed during aggregation.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Profit,
    Quantity,
}

serde_plain::derive_display_from_serialize!(Metric);
serde_plain::derive_fromstr_from_deserialize!(Metric);

impl Metric {
    pub fn header(&self) -> &'static str {
        match self {
            Metric::Profit => PROFIT_STR,
            Metric::Quantity => QUANTITY_STR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::SubCategory.to_string(), "sub-category");
        assert_eq!(Dimension::YearMonth.to_string(), "year-month");
        assert_eq!(Dimension::from_str("state").unwrap(), Dimension::State);
    }

    #[test]
    fn test_metric_header() {
        assert_eq!(Metric::Quantity.header(), "Quantity");
        assert_eq!(Metric::default(), Metric::Profit);
        assert_eq!(Metric::from_str("quantity").unwrap(), Metric::Quantity);
    }
}
