use crate::analysis::error::AnalysisError;
use crate::loading::error::LoadError;
use crate::reporting::error::ReportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherHeroError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Background load task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
