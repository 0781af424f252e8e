use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::{
    core::{
        dialect::{Dialect, Escaping, QuoteMode},
        item::{WriteInput, shape_of},
        record::CsvAttributes,
    },
    error::{CsvError, CsvResult, Origin},
};

/// A CSV writer formatting rows under a [`Dialect`].
///
/// When the dialect includes a header row, the configured header names are
/// written first, and keyed rows and records are projected onto them: each
/// output column is looked up by name, in header order. Ordered rows are
/// always written as they are.
///
/// Dialects with an escape character distinct from their quote write it
/// before quotes and before itself inside quoted fields. A dialect without
/// quoting writes it before delimiters, line breaks (as `\r` and `\n`) and
/// itself. Null values are written as the null string and never escaped.
///
/// # Examples
///
/// ```
/// use csv_transcoder::core::dialect::DialectBuilder;
/// use csv_transcoder::core::item::WriteInput;
/// use csv_transcoder::item::csv::csv_writer::CsvItemWriter;
///
/// let dialect = DialectBuilder::new()
///     .include_header_row(true)
///     .header_names(["Header 1", "Header 2", "Header 3"])
///     .build()
///     .unwrap();
///
/// let rows = vec![
///     WriteInput::from_strings(["one", "two", "three"]),
///     WriteInput::from_strings(["four", "five", "six"]),
/// ];
///
/// let csv = CsvItemWriter::new(&dialect).write_to_string(&rows).unwrap();
/// assert_eq!(
///     csv,
///     "Header 1,Header 2,Header 3\r\none,two,three\r\nfour,five,six\r\n"
/// );
/// ```
pub struct CsvItemWriter<'a> {
    dialect: &'a Dialect,
}

impl<'a> CsvItemWriter<'a> {
    pub fn new(dialect: &'a Dialect) -> Self {
        CsvItemWriter { dialect }
    }

    /// Writes `rows` to `sink`, flushes it once and hands it back.
    ///
    /// # Errors
    ///
    /// - [`CsvError::Write`] if the sink fails
    /// - [`CsvError::ColumnNotFound`] if a record lacks a configured header
    pub fn write<W: Write>(&self, rows: &[WriteInput], sink: W) -> CsvResult<W> {
        self.write_rows(rows, sink, &Origin::Payload)
    }

    /// Writes `rows` into a new string.
    pub fn write_to_string(&self, rows: &[WriteInput]) -> CsvResult<String> {
        let buffer = self.write(rows, Vec::new())?;
        String::from_utf8(buffer).map_err(|error| CsvError::Write {
            origin: Origin::Payload,
            source: csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, error)),
        })
    }

    /// Writes `rows` into the file at `path`, replacing its content.
    ///
    /// The returned attributes name the destination file.
    pub fn write_to_path<P: AsRef<Path>>(
        &self,
        rows: &[WriteInput],
        path: P,
    ) -> CsvResult<CsvAttributes> {
        let path = path.as_ref();
        let origin = Origin::File(path.to_path_buf());

        let file = File::create(path).map_err(|error| CsvError::Write {
            origin: origin.clone(),
            source: csv::Error::from(error),
        })?;
        self.write_rows(rows, BufWriter::new(file), &origin)?;

        info!("Wrote {} CSV rows to {}", rows.len(), path.display());

        Ok(CsvAttributes::from_file(path))
    }

    /// Writes a JSON payload holding a list of rows.
    ///
    /// A missing or `null` payload writes the header row only (if any). Every
    /// element is checked before anything is written.
    ///
    /// # Errors
    ///
    /// [`CsvError::UnsupportedPayloadType`] if the payload is not a list, or if
    /// one of its elements is neither a list nor a map.
    pub fn write_payload<W: Write>(&self, payload: Option<&Value>, sink: W) -> CsvResult<W> {
        let rows = match payload {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(values)) => values
                .iter()
                .cloned()
                .map(WriteInput::try_from)
                .collect::<CsvResult<Vec<_>>>()?,
            Some(other) => {
                return Err(CsvError::UnsupportedPayloadType {
                    shape: shape_of(other).to_string(),
                });
            }
        };
        self.write(&rows, sink)
    }

    /// Writes serializable items, each converted to a row through its JSON
    /// form: structs and maps become keyed rows, sequences ordered rows.
    pub fn write_items<T: Serialize, W: Write>(&self, items: &[T], sink: W) -> CsvResult<W> {
        let rows = items
            .iter()
            .map(|item| {
                serde_json::to_value(item)
                    .map_err(|source| CsvError::Serialize { source })
                    .and_then(WriteInput::try_from)
            })
            .collect::<CsvResult<Vec<_>>>()?;
        self.write(&rows, sink)
    }

    fn write_rows<W: Write>(&self, rows: &[WriteInput], sink: W, origin: &Origin) -> CsvResult<W> {
        let write_error = |source: csv::Error| CsvError::Write {
            origin: origin.clone(),
            source,
        };

        let mut writer = self.dialect.writer_builder().from_writer(sink);

        if self.dialect.include_header_row() {
            let names = self.dialect.header_names().iter().cloned().map(Some);
            writer
                .write_record(self.protect(names.collect()))
                .map_err(write_error)?;
        }
        for row in rows {
            let fields = self.protect(self.fields(row)?);
            writer.write_record(&fields).map_err(write_error)?;
        }

        let sink = writer
            .into_inner()
            .map_err(|error| write_error(csv::Error::from(error.into_error())))?;

        debug!("Wrote {} CSV rows to {}", rows.len(), origin);
        Ok(sink)
    }

    /// The output fields of one row, projected onto the header names when the
    /// header row is included. `None` stands for a null value.
    fn fields(&self, row: &WriteInput) -> CsvResult<Vec<Option<String>>> {
        let headers = self
            .dialect
            .include_header_row()
            .then(|| self.dialect.header_names());

        match (row, headers) {
            (WriteInput::OrderedFields(values), _) => {
                Ok(values.iter().map(|value| self.render(value)).collect())
            }
            (WriteInput::KeyedFields(map), Some(headers)) => Ok(headers
                .iter()
                .map(|name| {
                    map.get(name)
                        .map_or_else(|| Some(String::new()), |value| self.render(value))
                })
                .collect()),
            (WriteInput::KeyedFields(map), None) => {
                Ok(map.values().map(|value| self.render(value)).collect())
            }
            (WriteInput::HeaderedRecord(record), Some(headers)) => headers
                .iter()
                .map(|name| record.get_by_name(name).map(|value| Some(value.to_string())))
                .collect(),
            (WriteInput::HeaderedRecord(record), None) => {
                Ok(record.values().iter().cloned().map(Some).collect())
            }
        }
    }

    fn render(&self, value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Final text of each field: nulls become the null string, other values
    /// are quoted and escaped as the dialect requires.
    fn protect(&self, fields: Vec<Option<String>>) -> Vec<String> {
        let null = self.dialect.null_string().unwrap_or_default();
        let sole_empty = matches!(fields.as_slice(), [Some(field)] if field.is_empty());
        let delimiter = self.dialect.delimiter();

        fields
            .into_iter()
            .map(|field| match (field, self.dialect.escaping()) {
                (None, _) => null.to_string(),
                (Some(text), Escaping::Doubled) => text,
                (Some(text), Escaping::InQuotes { quote, escape }) => {
                    let needs_quotes = self.dialect.quote_mode() == QuoteMode::AllNonNull
                        || sole_empty
                        || text
                            .chars()
                            .any(|c| c == delimiter || c == quote || c == '\r' || c == '\n');
                    if needs_quotes {
                        quote_with_escapes(&text, quote, escape)
                    } else {
                        text
                    }
                }
                (Some(text), Escaping::Bare { escape }) => escape_bare(&text, escape, delimiter),
            })
            .collect()
    }
}

fn quote_with_escapes(text: &str, quote: char, escape: char) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(quote);
    for c in text.chars() {
        if c == quote || c == escape {
            quoted.push(escape);
        }
        quoted.push(c);
    }
    quoted.push(quote);
    quoted
}

fn escape_bare(text: &str, escape: char, delimiter: char) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\r' => {
                escaped.push(escape);
                escaped.push('r');
            }
            '\n' => {
                escaped.push(escape);
                escaped.push('n');
            }
            c if c == escape || c == delimiter => {
                escaped.push(escape);
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use std::{error::Error, sync::Arc};

    use serde_json::json;

    use crate::core::{
        dialect::{DialectBuilder, Preset},
        record::{Header, Record},
    };

    use super::*;

    fn record(names: &[&str], values: &[&str]) -> Record {
        let header = Header::new(names.iter().map(|name| name.to_string()).collect());
        Record::new(
            Arc::new(header),
            values.iter().map(|value| value.to_string()).collect(),
        )
    }

    fn with_headers(names: &[&str]) -> Dialect {
        DialectBuilder::new()
            .include_header_row(true)
            .header_names(names.iter().copied())
            .build()
            .unwrap()
    }

    #[test]
    fn lists_are_written_in_order() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::default();
        let rows = vec![
            WriteInput::from_strings(["one", "two", "three"]),
            WriteInput::from_strings(["four", "five", "six"]),
        ];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        assert_eq!(csv, "one,two,three\r\nfour,five,six\r\n");
        Ok(())
    }

    #[test]
    fn no_rows_writes_only_the_header() -> Result<(), Box<dyn Error>> {
        let plain = Dialect::default();
        let headed = with_headers(&["a", "b"]);

        assert_eq!(CsvItemWriter::new(&plain).write_to_string(&[])?, "");
        assert_eq!(CsvItemWriter::new(&headed).write_to_string(&[])?, "a,b\r\n");
        Ok(())
    }

    #[test]
    fn records_are_projected_onto_headers() -> Result<(), Box<dyn Error>> {
        let dialect = with_headers(&["H1", "H3"]);
        let rows = vec![WriteInput::from(record(
            &["H1", "H2", "H3"],
            &["one", "two", "three"],
        ))];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        assert_eq!(csv, "H1,H3\r\none,three\r\n");
        Ok(())
    }

    #[test]
    fn records_without_headers_keep_their_positions() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::default();
        let rows = vec![
            WriteInput::from(record(&["a", "b"], &["one", "two"])),
            WriteInput::from(record(&["a", "b"], &["three", "four"])),
        ];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        assert_eq!(csv, "one,two\r\nthree,four\r\n");
        Ok(())
    }

    #[test]
    fn record_missing_a_header_column_fails() {
        let dialect = with_headers(&["H1", "H4"]);
        let rows = vec![WriteInput::from(record(&["H1", "H2"], &["one", "two"]))];

        let error = CsvItemWriter::new(&dialect)
            .write_to_string(&rows)
            .unwrap_err();

        assert!(matches!(error, CsvError::ColumnNotFound { ref column } if column == "H4"));
    }

    #[test]
    fn maps_are_projected_with_blank_missing_keys() -> Result<(), Box<dyn Error>> {
        let dialect = with_headers(&["name", "age", "city"]);
        let row = WriteInput::try_from(json!({ "city": "Boston", "name": "Alice" }))?;

        let csv = CsvItemWriter::new(&dialect).write_to_string(&[row])?;

        assert_eq!(csv, "name,age,city\r\nAlice,,Boston\r\n");
        Ok(())
    }

    #[test]
    fn maps_without_headers_keep_insertion_order() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::default();
        let row = WriteInput::try_from(json!({ "z": 1, "a": true, "m": 2.5 }))?;

        let csv = CsvItemWriter::new(&dialect).write_to_string(&[row])?;

        assert_eq!(csv, "1,true,2.5\r\n");
        Ok(())
    }

    #[test]
    fn special_characters_are_quoted() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::default();
        let rows = vec![WriteInput::from_strings(["a,b", "say \"hi\"", "two\nlines", "plain"])];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        assert_eq!(csv, "\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\",plain\r\n");
        Ok(())
    }

    #[test]
    fn mysql_writes_nulls_as_marker_without_quotes() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::from_preset(Preset::Mysql);
        let rows = vec![WriteInput::from(vec![json!("a"), Value::Null, json!(3)])];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        assert_eq!(csv, "a\t\\N\t3\n");
        Ok(())
    }

    #[test]
    fn postgresql_csv_quotes_every_field() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::from_preset(Preset::PostgresqlCsv);
        let rows = vec![WriteInput::from(vec![json!("a"), json!(1)])];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        assert_eq!(csv, "\"a\",\"1\"\n");
        Ok(())
    }

    #[test]
    fn postgresql_text_escapes_inside_quotes() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::from_preset(Preset::PostgresqlText);
        let rows = vec![WriteInput::from(vec![json!("C:\\dir"), json!("x"), Value::Null])];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        assert_eq!(csv, "\"C:\\\\dir\"\t\"x\"\t\\N\n");
        Ok(())
    }

    #[test]
    fn informix_unload_escapes_quotes_and_escapes() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::from_preset(Preset::InformixUnload);
        let rows = vec![WriteInput::from_strings(["a\\\"b", "C:\\dir", "x"])];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        // only fields needing quotes are escaped
        assert_eq!(csv, "\"a\\\\\\\"b\"|C:\\dir|x\n");
        Ok(())
    }

    #[test]
    fn mysql_escapes_delimiters_line_breaks_and_escapes() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::from_preset(Preset::Mysql);
        let rows = vec![WriteInput::from_strings(["a\tb", "line\nbreak\r", "C:\\dir"])];

        let csv = CsvItemWriter::new(&dialect).write_to_string(&rows)?;

        assert_eq!(csv, "a\\\tb\tline\\nbreak\\r\tC:\\\\dir\n");
        Ok(())
    }

    #[test]
    fn null_payload_writes_nothing() -> Result<(), Box<dyn Error>> {
        let dialect = Dialect::default();
        let writer = CsvItemWriter::new(&dialect);

        assert!(writer.write_payload(None, Vec::new())?.is_empty());
        assert!(writer.write_payload(Some(&Value::Null), Vec::new())?.is_empty());
        assert!(writer.write_payload(Some(&json!([])), Vec::new())?.is_empty());
        Ok(())
    }

    #[test]
    fn payload_must_be_a_list_of_rows() {
        let dialect = Dialect::default();
        let writer = CsvItemWriter::new(&dialect);

        let not_a_list = writer
            .write_payload(Some(&json!("one,two")), Vec::new())
            .unwrap_err();
        assert!(
            matches!(not_a_list, CsvError::UnsupportedPayloadType { ref shape } if shape == "string")
        );

        let bad_element = writer
            .write_payload(Some(&json!([["ok"], 42])), Vec::new())
            .unwrap_err();
        assert!(
            matches!(bad_element, CsvError::UnsupportedPayloadType { ref shape } if shape == "number")
        );
    }

    #[test]
    fn serializable_items_are_written() -> Result<(), Box<dyn Error>> {
        #[derive(Serialize)]
        struct City<'a> {
            city: &'a str,
            pop: u64,
        }

        let dialect = with_headers(&["city", "pop"]);
        let items = [
            City {
                city: "Boston",
                pop: 4628910,
            },
            City {
                city: "Concord",
                pop: 42695,
            },
        ];

        let buffer = CsvItemWriter::new(&dialect).write_items(&items, Vec::new())?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "city,pop\r\nBoston,4628910\r\nConcord,42695\r\n"
        );
        Ok(())
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }
    }

    #[test]
    fn sink_failure_is_a_write_error() {
        let dialect = Dialect::default();
        let rows = vec![WriteInput::from_strings(["a"])];

        let error = CsvItemWriter::new(&dialect)
            .write(&rows, BrokenSink)
            .err()
            .expect("write should fail");

        assert!(matches!(error, CsvError::Write { origin: Origin::Payload, .. }));
    }
}
