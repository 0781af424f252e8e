use std::{fmt, str::FromStr};

use csv::{QuoteStyle, ReaderBuilder, Terminator, Trim, WriterBuilder};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{ConfigurationError, CsvError, CsvResult, MissingHeaders};

/// Named base dialects.
///
/// Each preset fixes a delimiter, a quote character, an escape policy, a
/// record separator and a null representation. The values follow the
/// well-known format definitions of the tools they are named after.
///
/// Presets are written with their upper snake case names (`DEFAULT`,
/// `MONGODB_CSV`, `RFC4180`, ...). Parsing, through [`FromStr`] or in
/// [`DialectOptions`], ignores case and surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Preset {
    #[default]
    Default,
    Excel,
    InformixUnload,
    InformixUnloadCsv,
    MongodbCsv,
    MongodbTsv,
    Mysql,
    Oracle,
    PostgresqlCsv,
    PostgresqlText,
    Rfc4180,
}

impl Preset {
    /// Every preset, in declaration order.
    pub const ALL: [Preset; 11] = [
        Preset::Default,
        Preset::Excel,
        Preset::InformixUnload,
        Preset::InformixUnloadCsv,
        Preset::MongodbCsv,
        Preset::MongodbTsv,
        Preset::Mysql,
        Preset::Oracle,
        Preset::PostgresqlCsv,
        Preset::PostgresqlText,
        Preset::Rfc4180,
    ];

    /// The configuration name of this preset.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "DEFAULT",
            Preset::Excel => "EXCEL",
            Preset::InformixUnload => "INFORMIX_UNLOAD",
            Preset::InformixUnloadCsv => "INFORMIX_UNLOAD_CSV",
            Preset::MongodbCsv => "MONGODB_CSV",
            Preset::MongodbTsv => "MONGODB_TSV",
            Preset::Mysql => "MYSQL",
            Preset::Oracle => "ORACLE",
            Preset::PostgresqlCsv => "POSTGRESQL_CSV",
            Preset::PostgresqlText => "POSTGRESQL_TEXT",
            Preset::Rfc4180 => "RFC4180",
        }
    }

    /// Base settings of this preset, before any user override.
    pub fn settings(self) -> PresetSettings {
        let default = PresetSettings::DEFAULT;
        match self {
            Preset::Default => default,
            Preset::Excel => PresetSettings {
                ignore_empty_lines: false,
                ..default
            },
            Preset::InformixUnload => PresetSettings {
                delimiter: b'|',
                escape: Some(b'\\'),
                record_separator: RecordSeparator::Lf,
                ..default
            },
            Preset::InformixUnloadCsv => PresetSettings {
                record_separator: RecordSeparator::Lf,
                ..default
            },
            Preset::MongodbCsv => PresetSettings {
                escape: Some(b'"'),
                ..default
            },
            Preset::MongodbTsv => PresetSettings {
                delimiter: b'\t',
                escape: Some(b'"'),
                ..default
            },
            Preset::Mysql => PresetSettings {
                delimiter: b'\t',
                quote: None,
                escape: Some(b'\\'),
                quote_mode: QuoteMode::AllNonNull,
                record_separator: RecordSeparator::Lf,
                null_string: Some("\\N"),
                ignore_empty_lines: false,
                ..default
            },
            Preset::Oracle => PresetSettings {
                escape: Some(b'\\'),
                record_separator: RecordSeparator::system(),
                null_string: Some("\\N"),
                trim: true,
                ignore_empty_lines: false,
                ..default
            },
            Preset::PostgresqlCsv => PresetSettings {
                escape: Some(b'"'),
                quote_mode: QuoteMode::AllNonNull,
                record_separator: RecordSeparator::Lf,
                null_string: Some(""),
                ignore_empty_lines: false,
                ..default
            },
            Preset::PostgresqlText => PresetSettings {
                delimiter: b'\t',
                escape: Some(b'\\'),
                quote_mode: QuoteMode::AllNonNull,
                record_separator: RecordSeparator::Lf,
                null_string: Some("\\N"),
                ignore_empty_lines: false,
                ..default
            },
            Preset::Rfc4180 => PresetSettings {
                ignore_empty_lines: false,
                ..default
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = CsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownPreset(s.to_string()).into())
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// When the writer wraps fields in quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMode {
    /// Only fields containing the delimiter, the quote or a line break.
    Minimal,
    /// Every field. Null fields are rendered with the null string.
    AllNonNull,
}

impl QuoteMode {
    fn quote_style(self) -> QuoteStyle {
        match self {
            QuoteMode::Minimal => QuoteStyle::Necessary,
            QuoteMode::AllNonNull => QuoteStyle::Always,
        }
    }
}

/// Line terminator emitted after each written record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSeparator {
    Crlf,
    Lf,
}

impl RecordSeparator {
    /// The separator of the platform this crate was compiled for.
    pub fn system() -> Self {
        if cfg!(windows) {
            RecordSeparator::Crlf
        } else {
            RecordSeparator::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordSeparator::Crlf => "\r\n",
            RecordSeparator::Lf => "\n",
        }
    }

    fn terminator(self) -> Terminator {
        match self {
            RecordSeparator::Crlf => Terminator::CRLF,
            RecordSeparator::Lf => Terminator::Any(b'\n'),
        }
    }
}

/// How the escape character of a dialect protects field text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escaping {
    /// No escape character distinct from the quote: quotes are doubled.
    Doubled,
    /// Inside quoted fields the escape character precedes quotes and itself.
    InQuotes { quote: char, escape: char },
    /// No quoting at all: the escape character precedes delimiters, line
    /// breaks and itself.
    Bare { escape: char },
}

/// The settings a [`Preset`] contributes to a [`Dialect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetSettings {
    pub delimiter: u8,
    /// `None` disables quoting altogether.
    pub quote: Option<u8>,
    pub escape: Option<u8>,
    pub quote_mode: QuoteMode,
    pub record_separator: RecordSeparator,
    /// How a null value is written. `None` writes nulls as empty fields.
    pub null_string: Option<&'static str>,
    pub trim: bool,
    pub ignore_empty_lines: bool,
}

impl PresetSettings {
    const DEFAULT: PresetSettings = PresetSettings {
        delimiter: b',',
        quote: Some(b'"'),
        escape: None,
        quote_mode: QuoteMode::Minimal,
        record_separator: RecordSeparator::Crlf,
        null_string: None,
        trim: false,
        ignore_empty_lines: true,
    };
}

/// A fully resolved set of rules used to tokenize and format delimited text.
///
/// A `Dialect` is immutable once built; obtain one through [`DialectBuilder`]
/// (or [`Dialect::from_preset`] when no override is needed).
///
/// # Examples
///
/// ```
/// use csv_transcoder::core::dialect::{Dialect, Preset};
///
/// let dialect = Dialect::builder()
///     .preset(Preset::Excel)
///     .delimiter(";")
///     .first_record_as_header(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(dialect.delimiter(), ';');
/// assert!(dialect.first_record_as_header());
/// assert!(!dialect.ignore_empty_lines());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    preset: Preset,
    delimiter: u8,
    quote: Option<u8>,
    escape: Option<u8>,
    quote_mode: QuoteMode,
    record_separator: RecordSeparator,
    null_string: Option<String>,
    trim: bool,
    first_record_as_header: bool,
    ignore_empty_lines: bool,
    include_header_row: bool,
    header_names: Vec<String>,
}

impl Dialect {
    pub fn builder() -> DialectBuilder {
        DialectBuilder::new()
    }

    /// The dialect of a preset with no override applied.
    pub fn from_preset(preset: Preset) -> Self {
        let settings = preset.settings();
        Dialect {
            preset,
            delimiter: settings.delimiter,
            quote: settings.quote,
            escape: settings.escape,
            quote_mode: settings.quote_mode,
            record_separator: settings.record_separator,
            null_string: settings.null_string.map(str::to_string),
            trim: settings.trim,
            first_record_as_header: false,
            ignore_empty_lines: settings.ignore_empty_lines,
            include_header_row: false,
            header_names: Vec::new(),
        }
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn delimiter(&self) -> char {
        char::from(self.delimiter)
    }

    pub fn quote(&self) -> Option<char> {
        self.quote.map(char::from)
    }

    pub fn escape(&self) -> Option<char> {
        self.escape.map(char::from)
    }

    pub fn quote_mode(&self) -> QuoteMode {
        self.quote_mode
    }

    pub fn record_separator(&self) -> RecordSeparator {
        self.record_separator
    }

    pub fn null_string(&self) -> Option<&str> {
        self.null_string.as_deref()
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    /// Read side: the first physical record holds the column names.
    pub fn first_record_as_header(&self) -> bool {
        self.first_record_as_header
    }

    /// Read side: blank lines produce no record.
    pub fn ignore_empty_lines(&self) -> bool {
        self.ignore_empty_lines
    }

    /// Write side: [`header_names`](Self::header_names) is written first and
    /// keyed rows and records are projected onto it.
    pub fn include_header_row(&self) -> bool {
        self.include_header_row
    }

    /// Write side header list. Non-empty whenever
    /// [`include_header_row`](Self::include_header_row) is set.
    pub fn header_names(&self) -> &[String] {
        &self.header_names
    }

    pub(crate) fn escaping(&self) -> Escaping {
        match (self.quote(), self.escape()) {
            (Some(quote), Some(escape)) if quote != escape => Escaping::InQuotes { quote, escape },
            (None, Some(escape)) => Escaping::Bare { escape },
            _ => Escaping::Doubled,
        }
    }

    /// A `csv` reader configuration for this dialect.
    ///
    /// Headers are handled by the caller and record widths may vary.
    pub(crate) fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .terminator(Terminator::CRLF)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .double_quote(true)
            // an escape equal to the quote is what double quoting already does
            .escape(self.escape.filter(|escape| Some(*escape) != self.quote));
        match self.quote {
            Some(quote) => builder.quote(quote).quoting(true),
            None => builder.quoting(false),
        };
        builder
    }

    /// A `csv` writer configuration for this dialect.
    ///
    /// Fields of escaping dialects are quoted and escaped by the caller, so
    /// the `csv` writer passes them through untouched.
    pub(crate) fn writer_builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .terminator(self.record_separator.terminator());
        match (self.quote, self.escaping()) {
            (Some(quote), Escaping::Doubled) => {
                builder.quote(quote).quote_style(self.quote_mode.quote_style())
            }
            _ => builder.quote_style(QuoteStyle::Never),
        };
        builder
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::from_preset(Preset::Default)
    }
}

/// A builder turning user-facing options into a [`Dialect`].
///
/// Overrides are applied on top of the preset in a fixed order: delimiter,
/// first record as header, ignore empty lines, trim, then header inclusion.
/// All validation happens in [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use csv_transcoder::core::dialect::DialectBuilder;
///
/// let result = DialectBuilder::new()
///     .include_header_row(true)
///     .build();
///
/// assert!(result.is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DialectBuilder {
    preset: Option<Preset>,
    delimiter: Option<String>,
    first_record_as_header: Option<bool>,
    ignore_empty_lines: Option<bool>,
    trim: Option<bool>,
    include_header_row: Option<bool>,
    header_names: Option<Vec<String>>,
}

impl DialectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base dialect. Defaults to [`Preset::Default`].
    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Overrides the preset delimiter.
    ///
    /// The delimiter must be a single ASCII character. Tokenizing works on
    /// bytes, so a one-character delimiter outside ASCII, such as `§`, is
    /// rejected by [`build`](Self::build) with
    /// [`ConfigurationError::InvalidDelimiter`] even though it is a single
    /// character.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn first_record_as_header(mut self, yes: bool) -> Self {
        self.first_record_as_header = Some(yes);
        self
    }

    pub fn ignore_empty_lines(mut self, yes: bool) -> Self {
        self.ignore_empty_lines = Some(yes);
        self
    }

    pub fn trim(mut self, yes: bool) -> Self {
        self.trim = Some(yes);
        self
    }

    pub fn include_header_row(mut self, yes: bool) -> Self {
        self.include_header_row = Some(yes);
        self
    }

    pub fn header_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Resolves the preset and applies every override.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::InvalidDelimiter`] if the delimiter is not a
    ///   single ASCII character, is a line break, or collides with the quote
    ///   or escape character of the preset
    /// - [`ConfigurationError::MissingHeaders`] if the header row is included
    ///   without a non-empty header list
    pub fn build(self) -> CsvResult<Dialect> {
        let preset = self.preset.unwrap_or_default();
        let mut dialect = Dialect::from_preset(preset);

        if let Some(raw) = self.delimiter.as_deref() {
            dialect.delimiter = parse_delimiter(raw, &dialect)?;
        }
        if let Some(yes) = self.first_record_as_header {
            dialect.first_record_as_header = yes;
        }
        if let Some(yes) = self.ignore_empty_lines {
            dialect.ignore_empty_lines = yes;
        }
        if let Some(yes) = self.trim {
            dialect.trim = yes;
        }
        if self.include_header_row.unwrap_or(false) {
            let names = self
                .header_names
                .ok_or(ConfigurationError::MissingHeaders(MissingHeaders::NotDefined))?;
            if names.is_empty() {
                return Err(ConfigurationError::MissingHeaders(MissingHeaders::Empty).into());
            }
            dialect.include_header_row = true;
            dialect.header_names = names;
        }

        debug!(
            "Resolved CSV dialect: preset={}, delimiter={:?}, header={}, trim={}, ignore_empty_lines={}",
            dialect.preset,
            dialect.delimiter(),
            dialect.first_record_as_header,
            dialect.trim,
            dialect.ignore_empty_lines
        );

        Ok(dialect)
    }
}

fn parse_delimiter(raw: &str, base: &Dialect) -> Result<u8, ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidDelimiter {
        delimiter: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut chars = raw.chars();
    let delimiter = match (chars.next(), chars.next()) {
        (Some(delimiter), None) => delimiter,
        _ => return Err(invalid("delimiter must be a single char")),
    };
    if !delimiter.is_ascii() {
        return Err(invalid("delimiter must be an ASCII char"));
    }
    if delimiter == '\r' || delimiter == '\n' {
        return Err(invalid("delimiter cannot be a line break"));
    }

    let byte = delimiter as u8;
    if base.quote == Some(byte) {
        return Err(invalid("delimiter cannot be the quote char"));
    }
    if base.escape == Some(byte) {
        return Err(invalid("delimiter cannot be the escape char"));
    }
    Ok(byte)
}

/// Dialect options as they appear in a component configuration.
///
/// Every field is optional; absent fields keep the preset value.
///
/// ```
/// use csv_transcoder::core::dialect::{DialectOptions, Preset};
///
/// let options = DialectOptions::from_json(
///     r#"{ "format": "MONGODB_CSV", "delimiter": ":", "firstRecordAsHeader": true }"#,
/// )
/// .unwrap();
/// let dialect = options.build().unwrap();
///
/// assert_eq!(dialect.preset(), Preset::MongodbCsv);
/// assert_eq!(dialect.delimiter(), ':');
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DialectOptions {
    pub format: Option<Preset>,
    pub delimiter: Option<String>,
    pub trim: Option<bool>,
    pub first_record_as_header: Option<bool>,
    pub ignore_empty_lines: Option<bool>,
    pub include_headers: Option<bool>,
    pub headers: Option<Vec<String>>,
}

impl DialectOptions {
    pub fn from_json(json: &str) -> CsvResult<Self> {
        serde_json::from_str(json).map_err(|error| ConfigurationError::Malformed(error).into())
    }

    pub fn builder(&self) -> DialectBuilder {
        DialectBuilder {
            preset: self.format,
            delimiter: self.delimiter.clone(),
            first_record_as_header: self.first_record_as_header,
            ignore_empty_lines: self.ignore_empty_lines,
            trim: self.trim,
            include_header_row: self.include_headers,
            header_names: self.headers.clone(),
        }
    }

    pub fn build(&self) -> CsvResult<Dialect> {
        self.builder().build()
    }
}
