//! Schema and numeric-column introspection

use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::{Value, ValueType};
use serde::Serialize;

/// Observed type and fill of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    pub inferred_type: ValueType,
    pub non_null_count: usize,
}

/// Descriptive statistics over the non-null cells of a numeric column.
///
/// `variance` and `std_dev` are sample statistics (divided by `n - 1`) and
/// are absent for fewer than two values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
}

/// A summary or the reason there is none, serialized as either the
/// statistics object or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryReport {
    Summary(NumericSummary),
    Failed { error: String },
}

impl From<Result<NumericSummary>> for SummaryReport {
    fn from(result: Result<NumericSummary>) -> Self {
        match result {
            Ok(summary) => SummaryReport::Summary(summary),
            Err(err) => SummaryReport::Failed {
                error: err.to_string(),
            },
        }
    }
}

/// Type shared by all non-null cells; `Unknown` if there are none and
/// `Mixed` if they disagree.
pub fn infer_type<'a, I>(values: I) -> ValueType
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut seen: Option<ValueType> = None;
    for value_type in values.into_iter().filter_map(Value::value_type) {
        match seen {
            None => seen = Some(value_type),
            Some(existing) if existing != value_type => return ValueType::Mixed,
            Some(_) => {}
        }
    }
    seen.unwrap_or(ValueType::Unknown)
}

/// One entry per column, in table column order.
pub fn schema(table: &Table) -> Vec<ColumnSchema> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let cells = || table.rows().iter().map(move |row| &row[position]);
            ColumnSchema {
                name: name.clone(),
                inferred_type: infer_type(cells()),
                non_null_count: cells().filter(|v| !v.is_null()).count(),
            }
        })
        .collect()
}

/// The schema as a table with columns `column`, `dtype`, `non_null_count`.
pub fn schema_table(table: &Table) -> Table {
    let rows = schema(table)
        .into_iter()
        .map(|entry| {
            vec![
                Value::Text(entry.name),
                Value::Text(entry.inferred_type.to_string()),
                Value::Number(entry.non_null_count as f64),
            ]
        })
        .collect();
    Table::from_rows(["column", "dtype", "non_null_count"], rows)
}

/// Statistics for `column`, which must hold only numbers and nulls and at
/// least one number.
pub fn numeric_summary(table: &Table, column: &str) -> Result<NumericSummary> {
    let cells: Vec<&Value> = table.column_values(column)?.collect();
    if infer_type(cells.iter().copied()) != ValueType::Number {
        return Err(Error::NonNumericColumn {
            column: column.to_string(),
        });
    }

    let mut values: Vec<f64> = cells.iter().filter_map(|v| v.as_number()).collect();
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let middle = count / 2;
    let median = if count % 2 == 0 {
        (values[middle - 1] + values[middle]) / 2.0
    } else {
        values[middle]
    };
    let variance = (count > 1)
        .then(|| values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0));

    Ok(NumericSummary {
        value_type: ValueType::Number,
        count,
        min: values[0],
        max: values[count - 1],
        mean,
        median,
        variance,
        std_dev: variance.map(f64::sqrt),
    })
}
