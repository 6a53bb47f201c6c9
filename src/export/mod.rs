//! Tabular export of aligned rows
//!
//! The pipeline hands a [`TabularWriter`] rows that are already aligned to the batch
//! [`ColumnSchema`](crate::models::ColumnSchema); the writer only renders and persists them.
//! [`DelimitedFileWriter`] appends to a delimited text file and writes the header row only
//! when the file does not exist yet, so repeated runs grow one table.

pub mod delimited;

use std::path::PathBuf;

use anyhow::Result;

use crate::models::{ColumnSchema, FlatRecord};

pub use delimited::{DEFAULT_DELIMITER, DelimitedFileWriter, write_delimited};

/// What a writer did with one batch of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub header_written: bool,
    pub rows_written: usize,
}

/// Persists schema-aligned rows
pub trait TabularWriter {
    fn write_rows(&mut self, schema: &ColumnSchema, rows: &[FlatRecord]) -> Result<ExportSummary>;
}
