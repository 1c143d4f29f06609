//! Delimited-file ingestion
//!
//! Reads a CSV file with a header row into a [`Table`], using arrow_csv for
//! schema inference and decoding. The file is read once per call; nothing
//! is cached.

use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::Value;
use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type, UInt16Type,
    UInt32Type, UInt64Type,
};
use arrow_array::{Array, RecordBatch};
use arrow_cast::display::{ArrayFormatter, FormatOptions};
use arrow_csv::reader::Format;
use arrow_schema::DataType;
use diagnostics::*;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

/// CSV reading options
///
/// All fields have defaults matching arrow_csv defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Whether the file has a header row (default: true)
    #[serde(default = "default_has_header")]
    pub has_header: bool,

    /// Quote character (default: '"')
    #[serde(default = "default_quote")]
    pub quote: char,

    /// Number of records per decoded batch (default: 8192)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Number of rows to sample for schema inference (default: 100)
    #[serde(default = "default_schema_infer_max_records")]
    pub schema_infer_max_records: usize,
}

fn default_delimiter() -> char {
    ','
}
fn default_has_header() -> bool {
    true
}
fn default_quote() -> char {
    '"'
}
fn default_batch_size() -> usize {
    8192
}
fn default_schema_infer_max_records() -> usize {
    100
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_header: default_has_header(),
            quote: default_quote(),
            batch_size: default_batch_size(),
            schema_infer_max_records: default_schema_infer_max_records(),
        }
    }
}

impl CsvOptions {
    fn format(&self) -> Result<Format> {
        Ok(Format::default()
            .with_delimiter(ascii_byte("delimiter", self.delimiter)?)
            .with_header(self.has_header)
            .with_quote(ascii_byte("quote", self.quote)?))
    }
}

fn ascii_byte(option: &str, c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(Error::InvalidOption {
            option: option.to_string(),
            reason: format!("'{c}' is not an ASCII character"),
        })
    }
}

/// Read a whole CSV stream into a table.
pub fn read_csv<R: Read>(mut reader: R, options: &CsvOptions) -> Result<Table> {
    let format = options.format()?;

    let mut bytes = Vec::new();
    let _ = reader.read_to_end(&mut bytes)?;

    let (schema, _) =
        format.infer_schema(Cursor::new(&bytes), Some(options.schema_infer_max_records))?;
    let schema = Arc::new(schema);

    let mut table = Table::new(schema.fields().iter().map(|f| f.name().clone()));

    let csv = arrow_csv::ReaderBuilder::new(schema)
        .with_format(format)
        .with_batch_size(options.batch_size)
        .build(Cursor::new(&bytes))?;

    for batch in csv {
        append_batch(&mut table, &batch?)?;
    }

    debug!(
        "Read {rows} CSV rows with {columns} columns",
        rows: table.len(),
        columns: table.columns().len()
    );
    Ok(table)
}

/// Open and read a CSV file.
pub fn read_csv_path<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Table> {
    let file = std::fs::File::open(path.as_ref())?;
    read_csv(file, options)
}

fn append_batch(table: &mut Table, batch: &RecordBatch) -> Result<()> {
    let options = FormatOptions::default();
    let formatters = batch
        .columns()
        .iter()
        .map(|array| ArrayFormatter::try_new(array.as_ref(), &options))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for row in 0..batch.num_rows() {
        let cells = batch
            .columns()
            .iter()
            .zip(&formatters)
            .map(|(array, formatter)| cell(array.as_ref(), row, formatter))
            .collect();
        table.push_row(cells);
    }
    Ok(())
}

fn cell(array: &dyn Array, row: usize, formatter: &ArrayFormatter<'_>) -> Value {
    if array.data_type() == &DataType::Null || array.is_null(row) {
        return Value::Null;
    }
    match array.data_type() {
        DataType::Boolean => Value::Boolean(array.as_boolean().value(row)),
        DataType::Int8 => Value::from(f64::from(array.as_primitive::<Int8Type>().value(row))),
        DataType::Int16 => Value::from(f64::from(array.as_primitive::<Int16Type>().value(row))),
        DataType::Int32 => Value::from(f64::from(array.as_primitive::<Int32Type>().value(row))),
        DataType::Int64 => Value::from(array.as_primitive::<Int64Type>().value(row) as f64),
        DataType::UInt8 => Value::from(f64::from(array.as_primitive::<UInt8Type>().value(row))),
        DataType::UInt16 => Value::from(f64::from(array.as_primitive::<UInt16Type>().value(row))),
        DataType::UInt32 => Value::from(f64::from(array.as_primitive::<UInt32Type>().value(row))),
        DataType::UInt64 => Value::from(array.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::Float32 => Value::from(f64::from(array.as_primitive::<Float32Type>().value(row))),
        DataType::Float64 => Value::from(array.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => Value::Text(array.as_string::<i32>().value(row).to_string()),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            Value::Date(formatter.value(row).to_string())
        }
        _ => Value::Text(formatter.value(row).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXPENSES: &str = "\
Name,Precio,Categoria,Subcategoria,Evento,year,Fecha,Pagado
Cena,25.5,Comida,Restaurante,,2023,2023-02-01,true
Alquiler,900,Casa,,,2023,2023-02-01,false
Regalo,40,Otros,,Boda,2022,2022-11-20,true
";

    #[test]
    fn test_read_csv_types() {
        let table = read_csv(EXPENSES.as_bytes(), &CsvOptions::default()).unwrap();

        assert_eq!(
            table.columns(),
            &["Name", "Precio", "Categoria", "Subcategoria", "Evento", "year", "Fecha", "Pagado"]
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.value(0, "Name"), Some(&Value::from("Cena")));
        assert_eq!(table.value(0, "Precio"), Some(&Value::from(25.5)));
        assert_eq!(table.value(1, "Precio"), Some(&Value::from(900)));
        assert_eq!(table.value(2, "year"), Some(&Value::from(2022)));
        assert_eq!(table.value(0, "Fecha"), Some(&Value::Date("2023-02-01".into())));
        assert_eq!(table.value(1, "Pagado"), Some(&Value::from(false)));
        assert_eq!(table.value(1, "Subcategoria"), Some(&Value::Null));
        assert_eq!(table.value(2, "Evento"), Some(&Value::from("Boda")));
    }

    #[test]
    fn test_read_csv_path_with_delimiter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Name;Precio\nA;1\nB;2\n").unwrap();

        let options = CsvOptions {
            delimiter: ';',
            ..CsvOptions::default()
        };
        let table = read_csv_path(file.path(), &options).unwrap();
        assert_eq!(table.columns(), &["Name", "Precio"]);
        assert_eq!(table.value(1, "Precio"), Some(&Value::from(2)));
    }

    #[test]
    fn test_non_ascii_options_are_rejected() {
        let options = CsvOptions {
            delimiter: '§',
            ..CsvOptions::default()
        };
        let err = read_csv(EXPENSES.as_bytes(), &options).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { ref option, .. } if option == "delimiter"));

        let options = CsvOptions {
            quote: '«',
            ..CsvOptions::default()
        };
        let err = read_csv(EXPENSES.as_bytes(), &options).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { ref option, .. } if option == "quote"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_csv_path("/nonexistent/expenses.csv", &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_options_defaults_from_yaml_like_json() {
        let options: CsvOptions = serde_json::from_str(r#"{"delimiter": "\t"}"#).unwrap();
        assert_eq!(options.delimiter, '\t');
        assert!(options.has_header);
        assert_eq!(options.batch_size, 8192);
    }
}
