/// Dialect presets, options and the builder resolving them.
pub mod dialect;

/// Rows accepted by the writer.
pub mod item;

/// Rows, headers and records produced by the reader.
pub mod record;
