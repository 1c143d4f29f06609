//! Typed property records and the flattening transform
//!
//! An external record is a bag of named properties, each tagged with its
//! type (`title`, `select`, `number`, ...). [`flatten`] decodes every
//! property into a [`Value`] and lines the records up as a [`Table`].
//!
//! Decoding never aborts ingestion: a tag we do not model becomes `Null`,
//! and so does a property whose tag is missing or whose body does not match
//! its tag (logged as a malformed record).

use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::Value;
use diagnostics::*;
use serde::{Deserialize, Serialize};

/// One fragment of a title or rich-text property
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
        }
    }
}

/// A configured or chosen option of a select/multi-select property
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectOption {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Result of a formula property, tagged with its declared result type
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    String { string: Option<String> },
    Number { number: Option<f64> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateRange> },
    #[serde(other)]
    Unsupported,
}

/// A property value, dispatched on its `type` tag
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Checkbox {
        checkbox: bool,
    },
    Number {
        number: Option<f64>,
    },
    Date {
        date: Option<DateRange>,
    },
    Formula {
        formula: FormulaValue,
    },
    CreatedTime {
        created_time: String,
    },
    LastEditedTime {
        last_edited_time: String,
    },
    Url {
        url: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

/// A property as received: decodable, or malformed with the reason
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Known(PropertyValue),
    Malformed(String),
}

impl Property {
    /// Decode to a cell value. Malformed properties fail with
    /// `MalformedRecord` naming `field`.
    pub fn decode(&self, field: &str) -> Result<Value> {
        match self {
            Property::Known(value) => Ok(decode(value)),
            Property::Malformed(reason) => Err(Error::MalformedRecord {
                field: field.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

impl From<serde_json::Value> for Property {
    fn from(raw: serde_json::Value) -> Self {
        match serde_json::from_value::<PropertyValue>(raw) {
            Ok(value) => Property::Known(value),
            Err(err) => Property::Malformed(err.to_string()),
        }
    }
}

/// One external record: named properties in source order
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "serde_json::Map<String, serde_json::Value>")]
pub struct PropertyBag {
    fields: Vec<(String, Property)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.fields.push((name.into(), Property::Known(value)));
        self
    }

    /// Parse a JSON object of `name -> property` pairs.
    pub fn from_json(raw: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(raw)?)
    }

    pub fn fields(&self) -> &[(String, Property)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode every property; malformed ones become `Null`.
    pub fn to_row(&self) -> Vec<(String, Value)> {
        self.fields
            .iter()
            .map(|(name, property)| {
                let value = property.decode(name).unwrap_or_else(|err| {
                    warn!("Decoding property as null: {reason}", reason: err.to_string());
                    Value::Null
                });
                (name.clone(), value)
            })
            .collect()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for PropertyBag {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: map
                .into_iter()
                .map(|(name, raw)| (name, Property::from(raw)))
                .collect(),
        }
    }
}

/// A database page as returned by a query: an id and its properties
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: PropertyBag,
}

/// Decode one property value to a cell.
pub fn decode(property: &PropertyValue) -> Value {
    match property {
        PropertyValue::Title { title: spans } | PropertyValue::RichText { rich_text: spans } => {
            Value::Text(spans.iter().map(|s| s.plain_text.as_str()).collect())
        }
        PropertyValue::Select { select } => select
            .as_ref()
            .map_or(Value::Null, |option| Value::Text(option.name.clone())),
        PropertyValue::MultiSelect { multi_select } => {
            Value::List(multi_select.iter().map(|o| o.name.clone()).collect())
        }
        PropertyValue::Checkbox { checkbox } => Value::Boolean(*checkbox),
        PropertyValue::Number { number } => Value::from(*number),
        PropertyValue::Date { date } => decode_date(date.as_ref()),
        PropertyValue::Formula { formula } => decode_formula(formula),
        PropertyValue::CreatedTime { created_time: stamp }
        | PropertyValue::LastEditedTime {
            last_edited_time: stamp,
        } => Value::Date(stamp.clone()),
        PropertyValue::Url { url } => url.clone().map_or(Value::Null, Value::Text),
        PropertyValue::Unsupported => Value::Null,
    }
}

fn decode_date(date: Option<&DateRange>) -> Value {
    date.and_then(|d| d.start.clone())
        .map_or(Value::Null, Value::Date)
}

fn decode_formula(formula: &FormulaValue) -> Value {
    match formula {
        FormulaValue::String { string } => string.clone().map_or(Value::Null, Value::Text),
        FormulaValue::Number { number } => Value::from(*number),
        FormulaValue::Boolean { boolean } => Value::from(*boolean),
        FormulaValue::Date { date } => decode_date(date.as_ref()),
        FormulaValue::Unsupported => Value::Null,
    }
}

/// Flatten records into a table, one row per bag in input order.
pub fn flatten<'a, I>(bags: I) -> Table
where
    I: IntoIterator<Item = &'a PropertyBag>,
{
    let table = Table::from_records(bags.into_iter().map(PropertyBag::to_row));
    debug!(
        "Flattened {rows} records into {columns} columns",
        rows: table.len(),
        columns: table.columns().len()
    );
    table
}

/// Flatten the properties of database pages.
pub fn flatten_pages<'a, I>(pages: I) -> Table
where
    I: IntoIterator<Item = &'a Page>,
{
    flatten(pages.into_iter().map(|page| &page.properties))
}
