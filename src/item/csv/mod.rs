/// CSV support for reading and writing delimited text.
///
/// This module provides the two pipelines of the crate. Both are driven by a
/// resolved [`Dialect`](crate::core::dialect::Dialect) and neither depends on
/// the other.
///
/// # Module Architecture
///
/// 1. **CsvItemReader**: parses a whole document into
///    [`Row`](crate::core::record::Row)s, or into
///    [`Record`](crate::core::record::Record)s when the first line is a header.
///    It reads from strings, files, or any source implementing `Read`.
///
/// 2. **CsvItemWriter**: formats ordered lists, keyed maps and records, with
///    optional projection onto a configured header list. It writes to strings,
///    files, or any sink implementing `Write`.
///
/// Quoting and escaping follow the dialect on both sides, so text written
/// under a dialect reads back field for field under the same dialect.
///
/// # Examples
///
/// ## Reading with headers
///
/// ```
/// use csv_transcoder::core::dialect::{DialectBuilder, Preset};
/// use csv_transcoder::item::csv::csv_reader::CsvItemReader;
///
/// let csv_data = "\
/// Player Name,Position
/// Skippy Peterson,First Base
/// Vic Crumb,Shortstop
/// ";
///
/// let dialect = DialectBuilder::new()
///     .preset(Preset::Rfc4180)
///     .first_record_as_header(true)
///     .build()
///     .unwrap();
///
/// let records = CsvItemReader::new(&dialect)
///     .read_str(csv_data)
///     .unwrap()
///     .data
///     .into_records()
///     .unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].get_by_name("Position").unwrap(), "Shortstop");
/// ```
///
/// ## Reading and writing back
///
/// ```
/// use csv_transcoder::core::dialect::Dialect;
/// use csv_transcoder::core::item::WriteInput;
/// use csv_transcoder::item::csv::{csv_reader::CsvItemReader, csv_writer::CsvItemWriter};
///
/// let dialect = Dialect::default();
/// let rows = CsvItemReader::new(&dialect)
///     .read_str("a,\"b,c\"\r\nd,e\r\n")
///     .unwrap()
///     .data
///     .into_rows()
///     .unwrap();
///
/// let input: Vec<WriteInput> = rows.into_iter().map(WriteInput::from).collect();
/// let csv = CsvItemWriter::new(&dialect).write_to_string(&input).unwrap();
///
/// assert_eq!(csv, "a,\"b,c\"\r\nd,e\r\n");
/// ```

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;
