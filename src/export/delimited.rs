use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use super::{ExportSummary, TabularWriter};
use crate::models::{ColumnSchema, FlatRecord};

pub const DEFAULT_DELIMITER: char = ',';

/// Appends rows to a delimited text file (CSV by default)
#[derive(Debug, Clone)]
pub struct DelimitedFileWriter {
    path: PathBuf,
    delimiter: char,
}

impl DelimitedFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), delimiter: DEFAULT_DELIMITER }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self> {
        if delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
            bail!("Invalid delimiter {:?}", delimiter);
        }
        self.delimiter = delimiter;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TabularWriter for DelimitedFileWriter {
    fn write_rows(&mut self, schema: &ColumnSchema, rows: &[FlatRecord]) -> Result<ExportSummary> {
        if schema.is_empty() {
            debug!(path = %self.path.display(), "No columns to export, leaving file untouched");
            return Ok(ExportSummary {
                path: self.path.clone(),
                header_written: false,
                rows_written: 0,
            });
        }

        // An existing file already carries its header
        let header_written = !self.path.exists();

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create export directory: {}", parent.display())
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open export file: {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);

        write_delimited(&mut writer, schema, rows, header_written, self.delimiter)
            .with_context(|| format!("Failed to write export file: {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush export file: {}", self.path.display()))?;

        debug!(
            path = %self.path.display(),
            rows = rows.len(),
            header_written,
            "Appended rows to export file"
        );

        Ok(ExportSummary { path: self.path.clone(), header_written, rows_written: rows.len() })
    }
}

/// Render rows in schema column order. Cells are quoted only when they need it.
pub fn write_delimited<W: Write>(
    writer: &mut W,
    schema: &ColumnSchema,
    rows: &[FlatRecord],
    header: bool,
    delimiter: char,
) -> std::io::Result<()> {
    if header {
        write_line(writer, schema.columns().map(Cow::Borrowed), delimiter)?;
    }
    for row in rows {
        let cells = schema.columns().map(|column| match row.get(column) {
            Some(value) => value.as_field(),
            None => Cow::Borrowed(""),
        });
        write_line(writer, cells, delimiter)?;
    }
    Ok(())
}

fn write_line<'a, W, I>(writer: &mut W, cells: I, delimiter: char) -> std::io::Result<()>
where
    W: Write,
    I: Iterator<Item = Cow<'a, str>>,
{
    let mut separator = [0u8; 4];
    let separator = delimiter.encode_utf8(&mut separator);

    for (i, cell) in cells.enumerate() {
        if i > 0 {
            writer.write_all(separator.as_bytes())?;
        }
        writer.write_all(quote_cell(&cell, delimiter).as_bytes())?;
    }
    writer.write_all(b"\n")
}

fn quote_cell(cell: &str, delimiter: char) -> Cow<'_, str> {
    let needs_quotes =
        cell.contains(|c: char| c == delimiter || c == '"' || c == '\n' || c == '\r');
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}
