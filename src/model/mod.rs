//! Types that represent the core data model, such as `SalesRecord` and `Month`.
mod amount;
mod month;
mod record;
pub(crate) mod schema;
mod states;

pub use amount::{Amount, AmountError};
pub use month::{Month, MonthError, MONTHS};
pub use record::{parse_year_month, year_month_label, DimValue, RawSalesRow, SalesRecord};
pub use schema::{Dimension, Metric};
pub use states::state_code;
