use serde_json::{Map, Value};

use crate::{
    core::record::{Record, Row},
    error::CsvError,
};

/// One row handed to the CSV writer.
///
/// Keyed fields keep the insertion order of their map, which is the order
/// they are written in when no header projection is configured.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteInput {
    /// Values written in list order.
    OrderedFields(Vec<Value>),
    /// Values keyed by column name.
    KeyedFields(Map<String, Value>),
    /// A record produced by a headed read.
    HeaderedRecord(Record),
}

impl WriteInput {
    /// Builds an ordered row out of plain strings.
    pub fn from_strings<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WriteInput::OrderedFields(
            fields
                .into_iter()
                .map(|field| Value::String(field.into()))
                .collect(),
        )
    }
}

impl From<Vec<Value>> for WriteInput {
    fn from(values: Vec<Value>) -> Self {
        WriteInput::OrderedFields(values)
    }
}

impl From<Map<String, Value>> for WriteInput {
    fn from(map: Map<String, Value>) -> Self {
        WriteInput::KeyedFields(map)
    }
}

impl From<Record> for WriteInput {
    fn from(record: Record) -> Self {
        WriteInput::HeaderedRecord(record)
    }
}

impl From<Row> for WriteInput {
    fn from(row: Row) -> Self {
        WriteInput::from_strings(row)
    }
}

impl TryFrom<Value> for WriteInput {
    type Error = CsvError;

    /// Arrays become ordered rows and objects keyed rows; any other JSON value
    /// is not a row.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(values) => Ok(WriteInput::OrderedFields(values)),
            Value::Object(map) => Ok(WriteInput::KeyedFields(map)),
            other => Err(CsvError::UnsupportedPayloadType {
                shape: shape_of(&other).to_string(),
            }),
        }
    }
}

/// Name of the JSON shape of `value`, as reported in payload errors.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
