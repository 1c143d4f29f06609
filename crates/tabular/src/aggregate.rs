//! Group-by with a single numeric reduction
//!
//! Rows are partitioned by the tuple of their group-column values; `Null` is
//! a key like any other, so no row is dropped. Each partition reduces one
//! numeric column. Cells that are null or not numbers are excluded from the
//! reduction rather than coerced. A partition left with no numeric cells
//! reduces to `Null`, and for `sum` that is logged as a warning since the
//! group would otherwise be indistinguishable from a zero total.

use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::Value;
use diagnostics::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Reduction applied per group. `avg` and `mean` both parse as [`Avg`].
///
/// [`Avg`]: AggregateFunction::Avg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AggregateFunction {
    #[default]
    Sum,
    Max,
    Min,
    Avg,
}

impl AggregateFunction {
    /// Canonical name, used as the output column suffix
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Max => "max",
            AggregateFunction::Min => "min",
            AggregateFunction::Avg => "mean",
        }
    }
}

impl FromStr for AggregateFunction {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "sum" => Ok(AggregateFunction::Sum),
            "max" => Ok(AggregateFunction::Max),
            "min" => Ok(AggregateFunction::Min),
            "avg" | "mean" => Ok(AggregateFunction::Avg),
            other => Err(Error::UnknownAggregationFunction {
                function: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AggregateFunction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for AggregateFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// What to group by and what to reduce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    #[serde(alias = "group_fields")]
    pub group_columns: Vec<String>,
    #[serde(alias = "numeric_field")]
    pub numeric_column: String,
    #[serde(default, alias = "agg_func")]
    pub function: AggregateFunction,
}

impl AggregationSpec {
    pub fn new<I, S>(
        group_columns: I,
        numeric_column: impl Into<String>,
        function: AggregateFunction,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_columns: group_columns.into_iter().map(Into::into).collect(),
            numeric_column: numeric_column.into(),
            function,
        }
    }

    /// Like [`AggregationSpec::new`] with the function given by name.
    pub fn parse<I, S>(
        group_columns: I,
        numeric_column: impl Into<String>,
        function: &str,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(group_columns, numeric_column, function.parse()?))
    }

    /// Name of the reduced column in the output, e.g. `Precio_sum`
    pub fn output_column(&self) -> String {
        format!("{}_{}", self.numeric_column, self.function.name())
    }
}

/// One partition: its key values and the indices of its rows
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: Vec<Value>,
    pub rows: Vec<usize>,
}

/// Hashable form of a key cell. Numbers hash by normalized bit pattern so
/// `0.0`/`-0.0` and all NaNs each land in one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Boolean(bool),
    Number(u64),
    Text(String),
    Date(String),
    List(Vec<String>),
}

impl From<&Value> for KeyPart {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => KeyPart::Null,
            Value::Boolean(b) => KeyPart::Boolean(*b),
            Value::Number(n) if n.is_nan() => KeyPart::Number(f64::NAN.to_bits()),
            Value::Number(n) if *n == 0.0 => KeyPart::Number(0.0f64.to_bits()),
            Value::Number(n) => KeyPart::Number(n.to_bits()),
            Value::Text(s) => KeyPart::Text(s.clone()),
            Value::Date(s) => KeyPart::Date(s.clone()),
            Value::List(items) => KeyPart::List(items.clone()),
        }
    }
}

/// Partition rows by `group_columns`, groups in first-seen order.
pub fn group_rows(table: &Table, group_columns: &[String]) -> Result<Vec<Group>> {
    let positions: Vec<usize> = group_columns
        .iter()
        .map(|c| table.require_column(c))
        .collect::<Result<_>>()?;

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<Vec<KeyPart>, usize> = HashMap::new();

    for (row_index, row) in table.rows().iter().enumerate() {
        let key: Vec<KeyPart> = positions.iter().map(|p| KeyPart::from(&row[*p])).collect();
        match index.get(&key) {
            Some(slot) => groups[*slot].rows.push(row_index),
            None => {
                index.insert(key, groups.len());
                groups.push(Group {
                    key: positions.iter().map(|p| row[*p].clone()).collect(),
                    rows: vec![row_index],
                });
            }
        }
    }

    Ok(groups)
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
    excluded: usize,
}

impl Accumulator {
    fn push(&mut self, value: &Value) {
        match value.as_number() {
            Some(n) => {
                self.sum += n;
                self.count += 1;
                self.min = Some(self.min.map_or(n, |m| m.min(n)));
                self.max = Some(self.max.map_or(n, |m| m.max(n)));
            }
            None => self.excluded += 1,
        }
    }

    fn finish(&self, function: AggregateFunction) -> Value {
        if self.count == 0 {
            return Value::Null;
        }
        match function {
            AggregateFunction::Sum => Value::Number(self.sum),
            AggregateFunction::Max => Value::from(self.max),
            AggregateFunction::Min => Value::from(self.min),
            AggregateFunction::Avg => Value::Number(self.sum / self.count as f64),
        }
    }
}

/// Group `table` and reduce the numeric column per group.
///
/// Output columns are the group columns in the given order followed by
/// [`AggregationSpec::output_column`]; one row per distinct key.
pub fn aggregate(table: &Table, spec: &AggregationSpec) -> Result<Table> {
    let numeric = table.require_column(&spec.numeric_column)?;
    let groups = group_rows(table, &spec.group_columns)?;

    let mut columns = spec.group_columns.clone();
    columns.push(spec.output_column());
    let mut output = Table::new(columns);

    let mut excluded = 0usize;
    for group in groups {
        let mut acc = Accumulator::default();
        for row in &group.rows {
            acc.push(&table.rows()[*row][numeric]);
        }
        excluded += acc.excluded;

        if acc.count == 0 && spec.function == AggregateFunction::Sum {
            let key = group
                .key
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            warn!(
                "Sum group [{key}] has no numeric values in {rows} rows; reporting null",
                key: key,
                rows: group.rows.len()
            );
        }

        let mut row = group.key;
        row.push(acc.finish(spec.function));
        output.push_row(row);
    }

    debug!(
        "Aggregated into {groups} groups with {function}, excluding {excluded} non-numeric cells",
        groups: output.len(),
        function: spec.function.name(),
        excluded: excluded
    );
    Ok(output)
}
