/// This module provides the CSV reader and writer.
pub mod csv;
