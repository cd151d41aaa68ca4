use crate::model::{Dimension, Metric, Month};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// One row of the input file, exactly as read. Unknown columns are ignored.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawSalesRow {
    #[serde(rename = "Year-Month")]
    pub year_month: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Profit")]
    pub profit: String,
    /// Line in the source file where the row starts, when it was read from a file.
    #[serde(skip)]
    pub line: Option<u64>,
}

impl RawSalesRow {
    pub fn new(
        year_month: impl Into<String>,
        category: impl Into<String>,
        sub_category: impl Into<String>,
        state: impl Into<String>,
        quantity: impl Into<String>,
        profit: impl Into<String>,
    ) -> Self {
        Self {
            year_month: year_month.into(),
            category: category.into(),
            sub_category: sub_category.into(),
            state: state.into(),
            quantity: quantity.into(),
            profit: profit.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }
}

/// A normalized sales row. Derived date fields are computed once from `date` and never change.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SalesRecord {
    date: NaiveDate,
    year: i32,
    month: Month,
    category: String,
    sub_category: String,
    state: String,
    quantity: u32,
    profit: Decimal,
}

impl SalesRecord {
    /// `date` is normalized to the first of its month.
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        sub_category: impl Into<String>,
        state: impl Into<String>,
        quantity: u32,
        profit: Decimal,
    ) -> Self {
        let date = first_of_month(date);
        Self {
            date,
            year: date.year(),
            month: Month::of(date),
            category: category.into(),
            sub_category: sub_category.into(),
            state: state.into(),
            quantity,
            profit,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// e.g. `2023-Mar`
    pub fn year_month_label(&self) -> String {
        year_month_label(self.date)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn profit(&self) -> Decimal {
        self.profit
    }

    /// The value of this record along `dimension`.
    pub fn dim_value(&self, dimension: Dimension) -> DimValue {
        match dimension {
            Dimension::Year => DimValue::Year(self.year),
            Dimension::Month => DimValue::Month(self.month),
            Dimension::YearMonth => DimValue::YearMonth(self.date),
            Dimension::Category => DimValue::Text(self.category.clone()),
            Dimension::SubCategory => DimValue::Text(self.sub_category.clone()),
            Dimension::State => DimValue::Text(self.state.clone()),
        }
    }

    pub fn metric(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Profit => self.profit,
            Metric::Quantity => Decimal::from(self.quantity),
        }
    }
}

/// The value of a single dimension in a grouped row.
///
/// Within one column every value has the same variant, so the derived ordering is the natural
/// one: years numerically, months by calendar, year-months chronologically, text lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DimValue {
    Year(i32),
    Month(Month),
    YearMonth(NaiveDate),
    Text(String),
}

impl DimValue {
    pub fn as_month(&self) -> Option<Month> {
        match self {
            DimValue::Month(m) => Some(*m),
            _ => None,
        }
    }
}

impl Display for DimValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DimValue::Year(y) => write!(f, "{y}"),
            DimValue::Month(m) => write!(f, "{m}"),
            DimValue::YearMonth(d) => f.write_str(&year_month_label(*d)),
            DimValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for DimValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DimValue::Year(y) => serializer.serialize_i32(*y),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

/// Formats a date as `2023-Mar`.
pub fn year_month_label(date: NaiveDate) -> String {
    format!("{}-{}", date.year(), Month::of(date))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parses the `Year-Month` cell into the first day of that month.
///
/// Accepted forms: `2023-03`, `2023/03`, `03/2023`, `3-2023`, `2023-03-15`, `2023/03/15`,
/// `03/15/2023`, `2023-Mar`, `Mar-2023` and `Mar 2023`. Returns `None` for anything else.
pub fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(first_of_month(d));
        }
    }

    let (a, b) = s.split_once(['-', '/', ' '])?;
    let (a, b) = (a.trim(), b.trim());
    let (year, month) = match (a.parse::<i32>(), b.parse::<u32>()) {
        (Ok(y), Ok(m)) if a.len() == 4 => (y, Month::from_number(m)?),
        (Ok(y), Err(_)) if a.len() == 4 => (y, b.parse::<Month>().ok()?),
        (Ok(m), _) if a.len() <= 2 && b.len() == 4 => {
            (b.parse::<i32>().ok()?, Month::from_number(u32::try_from(m).ok()?)?)
        }
        (Err(_), _) if b.len() == 4 => (b.parse::<i32>().ok()?, a.parse::<Month>().ok()?),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month.number(), 1)
}
