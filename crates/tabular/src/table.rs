//! Flat row/column table shared by every query operation
//!
//! Rows are stored positionally, aligned with `columns`. Every row has one
//! cell per column; cells a record did not supply are `Null`. Operations take
//! `&Table` and build a new table, so a caller can keep the original around
//! for further queries.

use crate::error::{Error, Result};
use crate::value::Value;
use arrow_array::{ArrayRef, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Empty table with the given columns
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from positional rows. Short rows are padded with
    /// `Null`, long rows are cut to the column count.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Build a table from keyed records.
    ///
    /// The column set is the union of all keys in first-seen order. A key
    /// repeated within one record keeps its last value.
    pub fn from_records<I, R, K>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<Vec<Value>> = Vec::new();

        for record in records {
            let mut row = vec![Value::Null; columns.len()];
            for (key, value) in record {
                let key = key.into();
                let position = match index.get(&key) {
                    Some(position) => *position,
                    None => {
                        columns.push(key.clone());
                        index.insert(key, columns.len() - 1);
                        columns.len() - 1
                    }
                };
                if row.len() <= position {
                    row.resize(position + 1, Value::Null);
                }
                row[position] = value;
            }
            rows.push(row);
        }

        // Earlier rows predate columns introduced by later records
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, Value::Null);
        }

        Self { columns, rows }
    }

    pub(crate) fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// New table with the same columns and the given rows
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Table::column_index`], failing with `UnknownColumn`.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::unknown_column(name))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let position = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[position])
    }

    /// All cells of one column, in row order
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let position = self.require_column(column)?;
        Ok(self.rows.iter().map(move |row| &row[position]))
    }

    /// One row as (column, value) pairs
    pub fn record(&self, row: usize) -> Option<Vec<(&str, &Value)>> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(cells.iter())
                .collect(),
        )
    }

    /// Render as a bordered text grid
    pub fn pretty(&self) -> Result<String> {
        if self.columns.is_empty() {
            return Ok(String::new());
        }

        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, true))
            .collect();

        let arrays: Vec<ArrayRef> = (0..self.columns.len())
            .map(|position| {
                let cells: StringArray = self
                    .rows
                    .iter()
                    .map(|row| match &row[position] {
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect();
                Arc::new(cells) as ArrayRef
            })
            .collect();

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(arrow::util::pretty::pretty_format_batches(&[batch])?.to_string())
    }
}

/// Serialized in records orientation: `[{column: value, ...}, ...]`
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Record<'a>(&'a [String], &'a [Value]);

        impl Serialize for Record<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (column, value) in self.0.iter().zip(self.1) {
                    map.serialize_entry(column, value)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record(&self.columns, row))?;
        }
        seq.end()
    }
}
