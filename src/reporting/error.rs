use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create output directory '{0}'")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing report file '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing report file '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to read report file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Failed to prepare chart data for '{0}'")]
    ChartData(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
