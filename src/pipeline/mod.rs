//! The sales aggregation pipeline: load, filter, aggregate, order, smooth, find peaks, export.
//!
//! Everything here except `cache` is synchronous and works on in-memory values. Inputs are
//! never mutated; every step returns a new value.

mod aggregate;
mod cache;
mod export;
mod filter;
mod load;
mod order;
mod peak;
mod smooth;

pub use aggregate::{aggregate, AggregateTable, AggregatedRow, AggregationSpec};
pub use cache::{Dataset, DatasetCache, SourceKey};
pub use export::{to_csv_string, write_csv};
pub use filter::{
    apply_filters, EmptyReason, EmptySelectionPolicy, FilterCriteria, Filtered, Selection, ALL,
};
pub use load::{
    load_and_normalize, read_raw_rows, BadRowPolicy, Normalized, RawRows, SkippedRow,
};
pub use order::{order_by, order_by_metric_total, order_months};
pub use peak::peak_of;
pub use smooth::{smooth, SmoothingSpec};
