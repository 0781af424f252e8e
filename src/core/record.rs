use std::{collections::HashMap, ops::Index, path::PathBuf, sync::Arc};

use csv::StringRecord;
use serde::{Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap};

use crate::error::{CsvError, CsvResult};

/// A parsed line with positional access only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Row { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl From<Vec<String>> for Row {
    fn from(fields: Vec<String>) -> Self {
        Row::new(fields)
    }
}

impl<'a> From<Vec<&'a str>> for Row {
    fn from(fields: Vec<&'a str>) -> Self {
        Row::new(fields.into_iter().map(str::to_string).collect())
    }
}

impl Index<usize> for Row {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.fields[index]
    }
}

impl IntoIterator for Row {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Column names of a headed CSV input.
///
/// Built once from the header line, then shared by every [`Record`] of the
/// same parse. When a name appears more than once, lookups resolve to its
/// last position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    pub fn new(names: Vec<String>) -> Self {
        let positions = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();
        Header { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }
}

/// A parsed line whose fields can also be looked up by column name.
///
/// Records are read-only views over the values of one line and the
/// [`Header`] of the input they were read from. A record may hold more or
/// fewer values than the header has columns; a name lookup that does not land
/// on an existing value fails with [`CsvError::ColumnNotFound`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use csv_transcoder::core::record::{Header, Record};
///
/// let header = Arc::new(Header::new(vec!["city".into(), "country".into()]));
/// let record = Record::new(header, vec!["Boston".into(), "United States".into()]);
///
/// assert_eq!(record.get_by_name("country").unwrap(), "United States");
/// assert_eq!(record.get(0), Some("Boston"));
/// assert!(record.get_by_name("pop").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: Arc<Header>,
    values: Vec<String>,
}

impl Record {
    pub fn new(header: Arc<Header>, values: Vec<String>) -> Self {
        Record { header, values }
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    pub fn column_names(&self) -> &[String] {
        self.header.names()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn get_by_name(&self, column: &str) -> CsvResult<&str> {
        self.header
            .position(column)
            .and_then(|index| self.get(index))
            .ok_or_else(|| CsvError::ColumnNotFound {
                column: column.to_string(),
            })
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.header.contains(column)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `(column, value)` pairs in header order, for the columns this record
    /// has a value for.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .names()
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn to_row(&self) -> Row {
        Row::new(self.values.clone())
    }

    /// Converts this record into `T`, matching struct fields to column names.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use serde::Deserialize;
    /// use csv_transcoder::core::record::{Header, Record};
    ///
    /// #[derive(Deserialize)]
    /// struct City {
    ///     city: String,
    ///     pop: u32,
    /// }
    ///
    /// let header = Arc::new(Header::new(vec!["city".into(), "pop".into()]));
    /// let record = Record::new(header, vec!["Concord".into(), "42695".into()]);
    ///
    /// let city: City = record.deserialize().unwrap();
    /// assert_eq!(city.city, "Concord");
    /// assert_eq!(city.pop, 42695);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> CsvResult<T> {
        let headers = StringRecord::from(self.header.names().to_vec());
        let values = StringRecord::from(self.values.clone());
        values
            .deserialize(Some(&headers))
            .map_err(|source| CsvError::Deserialize { source })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.header.len().min(self.values.len());
        let mut map = serializer.serialize_map(Some(len))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parsed CSV content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CsvData {
    /// The input was read without a header line.
    Rows(Vec<Row>),
    /// The input was read with its first line as header.
    Records(Vec<Record>),
}

impl CsvData {
    pub fn len(&self) -> usize {
        match self {
            CsvData::Rows(rows) => rows.len(),
            CsvData::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_rows(&self) -> Option<&[Row]> {
        match self {
            CsvData::Rows(rows) => Some(rows),
            CsvData::Records(_) => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            CsvData::Rows(_) => None,
            CsvData::Records(records) => Some(records),
        }
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            CsvData::Rows(rows) => Some(rows),
            CsvData::Records(_) => None,
        }
    }

    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            CsvData::Rows(_) => None,
            CsvData::Records(records) => Some(records),
        }
    }
}

/// Attributes attached to the outcome of a read or a write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvAttributes {
    /// Source file of a read or destination file of a write. Absent for
    /// in-memory payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<PathBuf>,
}

impl CsvAttributes {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        CsvAttributes {
            file_name: Some(path.into()),
        }
    }
}

/// The outcome of a read: the parsed data and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutput {
    pub data: CsvData,
    pub attributes: CsvAttributes,
}
