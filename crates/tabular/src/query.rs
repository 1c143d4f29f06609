//! Filter-then-aggregate requests over one table snapshot

use crate::aggregate::{AggregationSpec, aggregate};
use crate::error::Result;
use crate::filter::{ConditionSet, filter};
use crate::table::Table;
use serde::Deserialize;

/// A declarative query: optional conditions, then an optional aggregation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub conditions: Option<ConditionSet>,
    #[serde(default)]
    pub aggregation: Option<AggregationSpec>,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conditions(mut self, conditions: ConditionSet) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn with_aggregation(mut self, spec: AggregationSpec) -> Self {
        self.aggregation = Some(spec);
        self
    }

    /// Run against `table`; the input is left untouched.
    pub fn execute(&self, table: &Table) -> Result<Table> {
        let filtered = filter(table, self.conditions.as_ref())?;
        match &self.aggregation {
            Some(spec) => aggregate(&filtered, spec),
            None => Ok(filtered),
        }
    }
}
