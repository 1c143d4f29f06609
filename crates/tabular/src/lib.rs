//! Tabular - queries over flattened property records
//!
//! Records arrive from a paginated source as bags of typed properties.
//! They are flattened into a [`Table`] which can then be filtered,
//! grouped and aggregated, or inspected for its schema and statistics.
//!
//! ```text
//! PageSource -> drain -> flatten -> Table -> filter -> aggregate
//!                                        \-> schema / numeric_summary
//! ```
//!
//! Every operation is a pure function of its inputs: it borrows a table and
//! returns a new one, never mutating what it was given.

pub mod aggregate;
pub mod csv;
pub mod error;
pub mod filter;
pub mod inspect;
pub mod query;
pub mod record;
pub mod source;
pub mod table;
pub mod value;

pub use aggregate::{AggregateFunction, AggregationSpec, Group, aggregate, group_rows};
pub use csv::{CsvOptions, read_csv, read_csv_path};
pub use error::{Error, Result};
pub use filter::{ConditionSet, Operator, filter};
pub use inspect::{
    ColumnSchema, NumericSummary, SummaryReport, numeric_summary, schema, schema_table,
};
pub use query::QueryRequest;
pub use record::{Page, Property, PropertyBag, PropertyValue, SelectOption, flatten, flatten_pages};
pub use source::{PageLimits, PageSource, RecordPage, drain, fetch_table};
pub use table::Table;
pub use value::{Comparison, Value, ValueType};
