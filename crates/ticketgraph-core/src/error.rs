#![allow(clippy::module_name_repetitions)]

use std::io;
use std::path::PathBuf;

/// Header-row problems that make a source unusable.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColumnError {
    /// The source had no lines at all.
    #[error("no header row found")]
    EmptySource,

    /// The mandatory identifier column is absent from the header row.
    #[error("'{column}' not found in header row")]
    MissingIdentifier { column: String },
}

/// Failure to turn one CSV input into a [`crate::source::CsvSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("couldn't open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't read {label}: {source}")]
    Read {
        label: String,
        #[source]
        source: csv::Error,
    },

    #[error("header failure in {label}: {source}")]
    Columns {
        label: String,
        #[source]
        source: ColumnError,
    },
}

/// Failure while writing the diagram.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("output failure: {0}")]
    Write(#[from] io::Error),

    /// Two distinct identifiers strip down to the same object name.
    #[error("tickets '{first}' and '{second}' both render as object '{normalized}'")]
    KeyCollision {
        first: String,
        second: String,
        normalized: String,
    },
}

/// Failure to load a TOML config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
