#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # CSV Transcoder

 A dialect-aware CSV engine: it parses delimited text into rows or
 header-aware records, and formats rows, maps and records back into delimited
 text, under a selectable dialect.

 ## Core Concepts

- **Dialect:** the resolved rules of one read or write: delimiter, quoting and
  escaping, record separator, trimming, blank-line and header handling. A
  `Dialect` starts from a named **Preset** (Excel, MySQL, PostgreSQL,
  RFC4180, ...) and applies user overrides through `DialectBuilder`.
- **Row:** an ordered list of string fields, produced when the input has no
  header line.
- **Record:** an ordered list of string fields plus the column names of the
  input, shared between all records of the same read.
- **WriteInput:** what the writer accepts per row: ordered values, keyed
  values or a record.

 ## Presets

| **Preset**          | **Delimiter** | **Quote** | **Escape** | **Separator** |
|---------------------|---------------|-----------|------------|---------------|
| DEFAULT             | `,`           | `"`       |            | CRLF          |
| EXCEL               | `,`           | `"`       |            | CRLF          |
| INFORMIX_UNLOAD     | `\|`          | `"`       | `\`        | LF            |
| INFORMIX_UNLOAD_CSV | `,`           | `"`       |            | LF            |
| MONGODB_CSV         | `,`           | `"`       | `"`        | CRLF          |
| MONGODB_TSV         | tab           | `"`       | `"`        | CRLF          |
| MYSQL               | tab           |           | `\`        | LF            |
| ORACLE              | `,`           | `"`       | `\`        | system        |
| POSTGRESQL_CSV      | `,`           | `"`       | `"`        | LF            |
| POSTGRESQL_TEXT     | tab           | `"`       | `\`        | LF            |
| RFC4180             | `,`           | `"`       |            | CRLF          |

 ## Getting Started

```rust
# use csv_transcoder::{
#     core::{dialect::DialectBuilder, item::WriteInput},
#     error::CsvError,
#     item::csv::{csv_reader::CsvItemReader, csv_writer::CsvItemWriter},
# };
fn main() -> Result<(), CsvError> {
    let csv = "Header 1,Header 2,Header 3
one,two,three
four,five,six";

    let read_dialect = DialectBuilder::new()
        .first_record_as_header(true)
        .build()?;

    let records = CsvItemReader::new(&read_dialect)
        .read_str(csv)?
        .data
        .into_records()
        .unwrap_or_default();

    let write_dialect = DialectBuilder::new()
        .include_header_row(true)
        .header_names(["Header 1", "Header 3"])
        .build()?;

    let rows: Vec<WriteInput> = records.into_iter().map(WriteInput::from).collect();
    let output = CsvItemWriter::new(&write_dialect).write_to_string(&rows)?;

    assert_eq!(output, "Header 1,Header 3\r\none,three\r\nfour,six\r\n");
    Ok(())
}
```

 ## Logging

 The crate logs through the [`log`](https://docs.rs/log) facade and never
 installs a logger itself.

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Dialects and the row data model
pub mod core;

/// Error types for CSV operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// CSV reader and writer
pub mod item;
