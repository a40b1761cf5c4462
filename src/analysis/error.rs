use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Required column '{column}' not found in the table")]
    SchemaMismatch { column: String },

    #[error("Statistic '{statistic}' is undefined for column '{column}': no non-missing values")]
    UndefinedStatistic {
        column: String,
        statistic: &'static str,
    },

    #[error("Column '{column}' cannot be used as numeric")]
    NotNumeric {
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
