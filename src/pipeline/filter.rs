//! Filtering records by category, sub-category and year.

use crate::model::{Dimension, SalesRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The sentinel that means "apply no restriction on this dimension".
pub const ALL: &str = "All";

/// The values chosen for one filter dimension.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Selection<T> {
    /// No restriction.
    All,
    /// Only these values. An empty list is an empty selection, which is handled according to
    /// the `EmptySelectionPolicy` of the criteria.
    Only(Vec<T>),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T> Selection<T> {
    fn is_empty(&self) -> bool {
        matches!(self, Selection::Only(v) if v.is_empty())
    }

    /// An empty `Only` admits everything here; rejecting it is decided before matching.
    fn admits(&self, pred: impl Fn(&T) -> bool) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(values) if values.is_empty() => true,
            Selection::Only(values) => values.iter().any(pred),
        }
    }
}

impl Selection<String> {
    /// Builds a selection from user-facing choices. Any choice equal to `All` yields
    /// `Selection::All`.
    pub fn from_choices<S: AsRef<str>>(choices: &[S]) -> Self {
        if choices.iter().any(|c| c.as_ref() == ALL) {
            return Selection::All;
        }
        Selection::Only(choices.iter().map(|c| c.as_ref().to_string()).collect())
    }
}

impl Selection<i32> {
    /// Like `Selection::<String>::from_choices` but for years. Returns the offending choice if
    /// one is neither `All` nor an integer.
    pub fn from_year_choices<S: AsRef<str>>(choices: &[S]) -> Result<Self, String> {
        if choices.iter().any(|c| c.as_ref() == ALL) {
            return Ok(Selection::All);
        }
        choices
            .iter()
            .map(|c| c.as_ref().trim().parse::<i32>().map_err(|_| c.as_ref().to_string()))
            .collect::<Result<Vec<i32>, String>>()
            .map(Selection::Only)
    }
}

/// How an empty selection (zero categories, zero years...) is interpreted.
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
pub enum EmptySelectionPolicy {
    /// Selecting nothing is reported as an empty result naming the dimension.
    #[default]
    Reject,
    /// Selecting nothing means no restriction.
    All,
}

serde_plain::derive_display_from_serialize!(EmptySelectionPolicy);
serde_plain::derive_fromstr_from_deserialize!(EmptySelectionPolicy);

/// The user's filter choices for a single request.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FilterCriteria {
    pub categories: Selection<String>,
    pub sub_categories: Selection<String>,
    pub years: Selection<i32>,
    pub empty_selection: EmptySelectionPolicy,
}

impl FilterCriteria {
    /// Whether a sub-category restriction is in effect. An empty selection never restricts:
    /// under `Reject` it yields no rows, under `All` it admits every sub-category.
    pub fn restricts_sub_categories(&self) -> bool {
        matches!(&self.sub_categories, Selection::Only(values) if !values.is_empty())
    }
}

/// Why a filter produced no rows.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The user selected zero values for this dimension.
    NothingSelected(Dimension),
    /// The selections were valid but no record matches all of them.
    NoMatchingRows,
}

impl Display for EmptyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::NothingSelected(d) => write!(f, "No {} selected", d.header()),
            EmptyReason::NoMatchingRows => f.write_str("No data for selected filters"),
        }
    }
}

/// The result of `apply_filters`. An empty result is a normal, displayable state.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Filtered {
    Rows(Vec<SalesRecord>),
    Empty(EmptyReason),
}

impl Filtered {
    /// The matching records; empty for `Filtered::Empty`.
    pub fn records(&self) -> &[SalesRecord] {
        match self {
            Filtered::Rows(rows) => rows,
            Filtered::Empty(_) => &[],
        }
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            Filtered::Rows(_) => None,
            Filtered::Empty(reason) => Some(*reason),
        }
    }
}

/// Keeps the records that match the category, sub-category and year selections, in that
/// order, preserving relative order.
pub fn apply_filters(records: &[SalesRecord], criteria: &FilterCriteria) -> Filtered {
    if criteria.empty_selection == EmptySelectionPolicy::Reject {
        let empties = [
            (Dimension::Category, criteria.categories.is_empty()),
            (Dimension::SubCategory, criteria.sub_categories.is_empty()),
            (Dimension::Year, criteria.years.is_empty()),
        ];
        if let Some((dimension, _)) = empties.iter().find(|(_, empty)| *empty) {
            return Filtered::Empty(EmptyReason::NothingSelected(*dimension));
        }
    }

    let rows: Vec<SalesRecord> = records
        .iter()
        .filter(|r| criteria.categories.admits(|c| c == r.category()))
        .filter(|r| criteria.sub_categories.admits(|s| s == r.sub_category()))
        .filter(|r| criteria.years.admits(|y| *y == r.year()))
        .cloned()
        .collect();

    if rows.is_empty() {
        Filtered::Empty(EmptyReason::NoMatchingRows)
    } else {
        Filtered::Rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::sample;

    fn criteria(categories: &[&str], subs: &[&str], years: &[&str]) -> FilterCriteria {
        FilterCriteria {
            categories: Selection::from_choices(categories),
            sub_categories: Selection::from_choices(subs),
            years: Selection::from_year_choices(years).unwrap(),
            empty_selection: EmptySelectionPolicy::Reject,
        }
    }

    #[test]
    fn test_furniture_2023() {
        let records = sample();
        let c = criteria(&["Furniture"], &[ALL], &["2023"]);
        let filtered = apply_filters(&records, &c);
        let rows = filtered.records();
        assert_eq!(rows.len(), 2);
        assert!(rows
            .iter()
            .all(|r| r.category() == "Furniture" && r.year() == 2023));
        // relative order preserved
        assert_eq!(rows[0].sub_category(), "Tables");
        assert_eq!(rows[1].sub_category(), "Chairs");

        let again = apply_filters(rows, &c);
        assert_eq!(again, filtered);
    }

    #[test]
    fn test_all_sentinel() {
        let records = sample();
        let filtered = apply_filters(&records, &criteria(&[ALL], &[ALL, "Chairs"], &[ALL]));
        assert_eq!(filtered.records(), records.as_slice());
    }

    #[test]
    fn test_sub_category_filter() {
        let records = sample();
        let filtered = apply_filters(
            &records,
            &criteria(&["Furniture", "Technology"], &["Chairs", "Phones"], &[ALL]),
        );
        let subs: Vec<&str> = filtered.records().iter().map(|r| r.sub_category()).collect();
        assert_eq!(subs, vec!["Chairs", "Phones", "Chairs"]);
    }

    #[test]
    fn test_no_matching_rows() {
        let records = sample();
        let filtered = apply_filters(&records, &criteria(&["Furniture"], &["Phones"], &[ALL]));
        assert_eq!(filtered, Filtered::Empty(EmptyReason::NoMatchingRows));
        assert!(filtered.records().is_empty());
    }

    #[test]
    fn test_empty_selection_rejected() {
        let records = sample();
        let c = criteria(&["Furniture"], &[ALL], &[]);
        assert_eq!(
            apply_filters(&records, &c),
            Filtered::Empty(EmptyReason::NothingSelected(Dimension::Year))
        );
    }

    #[test]
    fn test_empty_selection_as_all() {
        let records = sample();
        let mut c = criteria(&[], &[ALL], &["2022"]);
        c.empty_selection = EmptySelectionPolicy::All;
        let filtered = apply_filters(&records, &c);
        assert_eq!(filtered.records().len(), 2);
    }

    #[test]
    fn test_year_choices_parse() {
        assert_eq!(
            Selection::from_year_choices(&["2022", "2023"]).unwrap(),
            Selection::Only(vec![2022, 2023])
        );
        assert_eq!(
            Selection::from_year_choices(&["2022", "All"]).unwrap(),
            Selection::All
        );
        assert_eq!(
            Selection::<i32>::from_year_choices(&["last year"]).unwrap_err(),
            "last year"
        );
    }
}
