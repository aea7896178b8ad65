//! Loading one CSV input into memory.
//!
//! Fields are split on commas only: quote characters are ordinary text and a
//! comma inside a field is not supported. A source is read completely before
//! anything is merged from it, so a failure part-way through leaves the
//! ticket map untouched.
//!
//! Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
//! rejected; exports from older trackers are often Latin-1.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord};

use crate::columns::{ColumnMap, HeaderNames};
use crate::error::{ColumnError, SourceError};

/// A parsed CSV input: resolved columns plus its data rows.
#[derive(Debug, Clone)]
pub struct CsvSource {
    label: String,
    columns: ColumnMap,
    rows: Vec<StringRecord>,
}

impl CsvSource {
    /// Open and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// [`SourceError::Open`] if the file can't be opened, otherwise anything
    /// [`CsvSource::from_reader`] returns.
    pub fn open(path: &Path, names: &HeaderNames) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path.display().to_string(), file, names)
    }

    /// Parse a source from any reader. `label` names it in errors and logs.
    ///
    /// # Errors
    ///
    /// [`SourceError::Read`] on I/O failure, and
    /// [`SourceError::Columns`] when the header row is missing or lacks the
    /// identifier column.
    pub fn from_reader<R: Read>(
        label: impl Into<String>,
        reader: R,
        names: &HeaderNames,
    ) -> Result<Self, SourceError> {
        let label = label.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut records = reader.byte_records();
        let header = match records.next() {
            Some(record) => decode(&record.map_err(|source| SourceError::Read {
                label: label.clone(),
                source,
            })?),
            None => {
                return Err(SourceError::Columns {
                    label,
                    source: ColumnError::EmptySource,
                });
            }
        };

        let header_cells: Vec<&str> = header.iter().collect();
        let columns =
            ColumnMap::resolve(&header_cells, names).map_err(|source| SourceError::Columns {
                label: label.clone(),
                source,
            })?;

        let rows = records
            .map(|record| record.map(|bytes| decode(&bytes)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| SourceError::Read {
                label: label.clone(),
                source,
            })?;

        tracing::debug!(source = %label, rows = rows.len(), ?columns, "loaded source");

        Ok(Self {
            label,
            columns,
            rows,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Data rows, header excluded.
    #[must_use]
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }
}

fn decode(bytes: &ByteRecord) -> StringRecord {
    let mut record: StringRecord = bytes.iter().map(String::from_utf8_lossy).collect();
    record.set_position(bytes.position().cloned());
    record
}
