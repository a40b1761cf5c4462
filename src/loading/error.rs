use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Weather data file '{0}' not found")]
    FileNotFound(PathBuf),

    #[error("Unsupported file type for '{0}', expected a .csv file")]
    UnsupportedExtension(PathBuf),

    #[error("File '{0}' is not delimited text (parsed a single column)")]
    NotDelimited(PathBuf),

    // Row content that polars cannot parse against the header.
    #[error("Parsing error reading CSV data from '{path}'")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("I/O error reading '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read schema config '{path}'")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema config '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
