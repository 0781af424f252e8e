use std::{
    fs::File,
    io::{self, BufReader, Read},
    mem,
    path::Path,
    sync::Arc,
};

use csv::StringRecord;
use log::{debug, info, warn};

use crate::{
    core::{
        dialect::{Dialect, Escaping},
        record::{CsvAttributes, CsvData, Header, ReadOutput, Record, Row},
    },
    error::{CsvError, CsvResult, Origin},
};

/// A CSV reader parsing a whole document under a [`Dialect`].
///
/// The input is consumed and tokenized entirely before any row is returned.
/// Without header mode every physical record becomes a [`Row`]; with it the
/// first record names the columns and every following one becomes a
/// [`Record`] sharing that [`Header`].
///
/// # Examples
///
/// ```
/// use csv_transcoder::core::dialect::DialectBuilder;
/// use csv_transcoder::item::csv::csv_reader::CsvItemReader;
///
/// let dialect = DialectBuilder::new()
///     .first_record_as_header(true)
///     .build()
///     .unwrap();
///
/// let output = CsvItemReader::new(&dialect)
///     .read_str("city,pop\nBoston,4628910\nConcord,42695\n")
///     .unwrap();
///
/// let records = output.data.into_records().unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].get_by_name("city").unwrap(), "Concord");
/// assert!(output.attributes.file_name.is_none());
/// ```
pub struct CsvItemReader<'a> {
    dialect: &'a Dialect,
}

impl<'a> CsvItemReader<'a> {
    pub fn new(dialect: &'a Dialect) -> Self {
        CsvItemReader { dialect }
    }

    /// Reads CSV data from any stream.
    ///
    /// The stream is dropped before this method returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Read`] if the stream fails or holds invalid UTF-8.
    pub fn read<R: Read>(&self, input: R) -> CsvResult<ReadOutput> {
        let data = self.parse(input, &Origin::Payload)?;
        Ok(ReadOutput {
            data,
            attributes: CsvAttributes::default(),
        })
    }

    /// Reads CSV data from an in-memory payload.
    pub fn read_str(&self, payload: &str) -> CsvResult<ReadOutput> {
        self.read(payload.as_bytes())
    }

    /// Reads CSV data from a file. The file name is reported in the returned
    /// attributes and in any error.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> CsvResult<ReadOutput> {
        let path = path.as_ref();
        let origin = Origin::File(path.to_path_buf());

        let file = File::open(path).map_err(|error| CsvError::Read {
            origin: origin.clone(),
            source: csv::Error::from(error),
        })?;
        let data = self.parse(BufReader::new(file), &origin)?;

        info!("Read {} CSV rows from {}", data.len(), path.display());

        Ok(ReadOutput {
            data,
            attributes: CsvAttributes::from_file(path),
        })
    }

    fn parse<R: Read>(&self, mut input: R, origin: &Origin) -> CsvResult<CsvData> {
        let read_error = |source: csv::Error| CsvError::Read {
            origin: origin.clone(),
            source,
        };

        let mut buffer = Vec::new();
        input
            .read_to_end(&mut buffer)
            .map_err(|error| read_error(csv::Error::from(error)))?;
        drop(input);

        let physical = self.tokenize(&buffer).map_err(read_error)?;
        debug!(
            "Tokenized {} physical CSV records from {} ({} bytes)",
            physical.len(),
            origin,
            buffer.len()
        );

        if self.dialect.first_record_as_header() {
            Ok(CsvData::Records(into_records(physical)))
        } else {
            Ok(CsvData::Rows(physical.into_iter().map(Row::new).collect()))
        }
    }

    /// Splits `data` into physical records.
    ///
    /// The `csv` tokenizer always skips blank lines, so when the dialect keeps
    /// them they are recovered from the bytes consumed ahead of each record.
    fn tokenize(&self, data: &[u8]) -> Result<Vec<Vec<String>>, csv::Error> {
        if let Escaping::Bare { escape } = self.dialect.escaping() {
            return self.tokenize_escaped(data, escape);
        }

        let keep_blank_lines = !self.dialect.ignore_empty_lines();
        let mut reader = self.dialect.reader_builder().from_reader(data);
        let mut record = StringRecord::new();
        let mut physical = Vec::new();

        loop {
            let start = reader.position().byte() as usize;
            let more = reader.read_record(&mut record)?;
            if keep_blank_lines {
                for _ in 0..count_blank_lines(data, start) {
                    physical.push(vec![String::new()]);
                }
            }
            if !more {
                break;
            }
            physical.push(record.iter().map(str::to_string).collect());
        }

        Ok(physical)
    }

    /// Splits unquoted text where `escape` protects delimiters, line breaks
    /// and itself. The `csv` tokenizer only honours escapes inside quotes.
    fn tokenize_escaped(&self, data: &[u8], escape: char) -> Result<Vec<Vec<String>>, csv::Error> {
        let text = std::str::from_utf8(data)
            .map_err(|error| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, error)))?;
        let delimiter = self.dialect.delimiter();
        let mut lines = EscapedLines {
            physical: Vec::new(),
            fields: Vec::new(),
            field: String::new(),
            has_content: false,
            keep_blank_lines: !self.dialect.ignore_empty_lines(),
            trim: self.dialect.trim(),
        };

        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' | '\n' => {
                    if c == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    lines.end_line();
                }
                c if c == escape => {
                    lines.has_content = true;
                    match chars.next() {
                        Some(next) => unescape(next, escape, delimiter, &mut lines.field),
                        None => lines.field.push(escape),
                    }
                }
                c if c == delimiter => {
                    lines.has_content = true;
                    let field = mem::take(&mut lines.field);
                    lines.fields.push(field);
                }
                c => {
                    lines.has_content = true;
                    lines.field.push(c);
                }
            }
        }
        if lines.has_content {
            lines.end_line();
        }

        Ok(lines.physical)
    }
}

struct EscapedLines {
    physical: Vec<Vec<String>>,
    fields: Vec<String>,
    field: String,
    has_content: bool,
    keep_blank_lines: bool,
    trim: bool,
}

impl EscapedLines {
    fn end_line(&mut self) {
        if !self.has_content {
            if self.keep_blank_lines {
                self.physical.push(vec![String::new()]);
            }
            return;
        }

        let last = mem::take(&mut self.field);
        self.fields.push(last);
        let mut fields = mem::take(&mut self.fields);
        if self.trim {
            for field in &mut fields {
                *field = field.trim().to_string();
            }
        }
        self.physical.push(fields);
        self.has_content = false;
    }
}

/// Appends the character escaped by `next`. Unknown sequences such as the
/// MySQL null marker `\N` are kept as written.
fn unescape(next: char, escape: char, delimiter: char, field: &mut String) {
    match next {
        'r' => field.push('\r'),
        'n' => field.push('\n'),
        't' => field.push('\t'),
        'b' => field.push('\u{8}'),
        'f' => field.push('\u{c}'),
        c if c == escape || c == delimiter || c == '\r' || c == '\n' => field.push(c),
        c => {
            field.push(escape);
            field.push(c);
        }
    }
}

/// Turns the first physical record into the shared header and every other
/// one into a record against it.
fn into_records(physical: Vec<Vec<String>>) -> Vec<Record> {
    let mut lines = physical.into_iter();
    let header = match lines.next() {
        Some(names) => Arc::new(Header::new(names)),
        None => return Vec::new(),
    };

    lines
        .enumerate()
        .map(|(index, values)| {
            if values.len() != header.len() {
                warn!(
                    "CSV record {} has {} fields but the header has {} columns",
                    index + 1,
                    values.len(),
                    header.len()
                );
            }
            Record::new(Arc::clone(&header), values)
        })
        .collect()
}

/// Counts the empty lines starting at `start`.
///
/// A `\n` completing a `\r\n` terminator that ends just before `start` belongs
/// to the previous record and is not counted.
fn count_blank_lines(data: &[u8], start: usize) -> usize {
    let mut pos = start;
    if pos > 0 && data[pos - 1] == b'\r' && data.get(pos) == Some(&b'\n') {
        pos += 1;
    }

    let mut count = 0;
    while let Some(&byte) = data.get(pos) {
        match byte {
            b'\r' => {
                pos += 1;
                if data.get(pos) == Some(&b'\n') {
                    pos += 1;
                }
            }
            b'\n' => pos += 1,
            _ => break,
        }
        count += 1;
    }
    count
}
