//! Conjunctive comparison filters
//!
//! A [`ConditionSet`] maps columns to `(operator, literal)` pairs. A row is
//! kept only if it satisfies every pair on every column; there is no OR.
//!
//! Matching follows the comparison table in [`crate::value`]:
//!
//! | cell vs literal            | eq / neq        | gt / gte / lt / lte |
//! |----------------------------|-----------------|---------------------|
//! | number/number, date/date   | by ordering     | by ordering         |
//! | text, boolean, list        | by equality     | never               |
//! | date vs non-date text      | by equality     | never               |
//! | null or mismatched types   | never           | never               |

use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::{Comparison, Value};
use diagnostics::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
        }
    }

    /// Whether `cell <op> literal` holds.
    pub fn matches(&self, cell: &Value, literal: &Value) -> bool {
        match cell.compare(literal) {
            Comparison::Incomparable => false,
            Comparison::Equality(equal) => match self {
                Operator::Eq => equal,
                Operator::Neq => !equal,
                _ => false,
            },
            Comparison::Ordered(ordering) => match self {
                Operator::Eq => ordering == Ordering::Equal,
                Operator::Neq => ordering != Ordering::Equal,
                Operator::Gt => ordering == Ordering::Greater,
                Operator::Gte => ordering != Ordering::Less,
                Operator::Lt => ordering == Ordering::Less,
                Operator::Lte => ordering != Ordering::Greater,
            },
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(symbol: &str) -> Result<Self> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| Error::UnsupportedOperator {
                operator: symbol.to_string(),
            })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        symbol.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

/// Per-column comparison filter, validated at construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    conditions: Vec<(String, Vec<(Operator, Value)>)>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column <op> value`, conjoined with everything already present.
    pub fn with(
        mut self,
        column: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> Self {
        let column = column.into();
        let value = value.into();
        match self.conditions.iter_mut().find(|(c, _)| *c == column) {
            Some((_, ops)) => ops.push((op, value)),
            None => self.conditions.push((column, vec![(op, value)])),
        }
        self
    }

    /// Parse `{"column": {"op": literal, ...}, ...}`. Unknown operator
    /// symbols fail with `UnsupportedOperator`. A column with an empty
    /// operator map matches every row but is still checked by [`filter`].
    pub fn from_json(raw: serde_json::Value) -> Result<Self> {
        let map: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
            serde_json::from_value(raw)?;
        Self::from_map(map)
    }

    fn from_map(map: BTreeMap<String, BTreeMap<String, serde_json::Value>>) -> Result<Self> {
        let mut set = Self::new();
        for (column, ops) in map {
            // A column with no operators still has to exist in the table
            if ops.is_empty() {
                set.conditions.push((column, Vec::new()));
                continue;
            }
            for (symbol, literal) in ops {
                let op: Operator = symbol.parse()?;
                set = set.with(column.clone(), op, Value::from(literal));
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(Operator, Value)])> {
        self.conditions
            .iter()
            .map(|(c, ops)| (c.as_str(), ops.as_slice()))
    }
}

impl<'de> Deserialize<'de> for ConditionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map =
            BTreeMap::<String, BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
        Self::from_map(map).map_err(serde::de::Error::custom)
    }
}

/// Rows of `table` satisfying every condition, in their original order.
///
/// `None` or an empty set returns the table unchanged. Every condition column
/// is checked before any row is examined.
pub fn filter(table: &Table, conditions: Option<&ConditionSet>) -> Result<Table> {
    let conditions = match conditions {
        Some(c) if !c.is_empty() => c,
        _ => return Ok(table.clone()),
    };

    let resolved: Vec<(usize, &[(Operator, Value)])> = conditions
        .iter()
        .map(|(column, ops)| table.require_column(column).map(|position| (position, ops)))
        .collect::<Result<_>>()?;

    let rows: Vec<Vec<Value>> = table
        .rows()
        .iter()
        .filter(|row| {
            resolved.iter().all(|(position, ops)| {
                ops.iter()
                    .all(|(op, literal)| op.matches(&row[*position], literal))
            })
        })
        .cloned()
        .collect();

    debug!("Filter kept {after} of {before} rows", after: rows.len(), before: table.len());
    Ok(table.with_rows(rows))
}
