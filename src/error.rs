use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Result type used by every reading and writing operation.
pub type CsvResult<T> = Result<T, CsvError>;

#[derive(Error, Debug)]
/// CSV transcoding error
pub enum CsvError {
    #[error("invalid CSV configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("could not read CSV from {origin}, cause=[{source}]")]
    Read {
        origin: Origin,
        #[source]
        source: csv::Error,
    },

    #[error("could not write CSV to {origin}, cause=[{source}]")]
    Write {
        origin: Origin,
        #[source]
        source: csv::Error,
    },

    #[error("could not find CSV header column named=[{column}]")]
    ColumnNotFound { column: String },

    #[error("the payload must contain a list of rows, but type=[{shape}] was given")]
    UnsupportedPayloadType { shape: String },

    #[error("could not deserialize CSV record: {source}")]
    Deserialize {
        #[source]
        source: csv::Error,
    },

    #[error("could not convert item into a CSV row: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while resolving a [`Dialect`](crate::core::dialect::Dialect).
///
/// These are always reported by `build()`, before any row is read or written.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("delimiter=[{delimiter}] is not valid: {reason}")]
    InvalidDelimiter { delimiter: String, reason: String },

    #[error("{0}")]
    MissingHeaders(MissingHeaders),

    #[error("unknown CSV format=[{0}]")]
    UnknownPreset(String),

    #[error("malformed dialect options: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Why a header projection could not be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingHeaders {
    /// `include_header_row` was set but no header list was given.
    NotDefined,
    /// The header list was given but contains no names.
    Empty,
}

impl fmt::Display for MissingHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingHeaders::NotDefined => f.write_str("header list must be defined and not be empty"),
            MissingHeaders::Empty => f.write_str("header list must not be empty"),
        }
    }
}

/// Where the CSV data of a failed operation came from or was going to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// An in-memory payload or caller-provided stream.
    Payload,
    /// A file on the local file system.
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Payload => f.write_str("payload"),
            Origin::File(path) => write!(f, "file=[{}]", path.display()),
        }
    }
}
