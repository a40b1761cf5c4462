use crate::analysis::summary::SummaryStatistics;
use crate::reporting::error::ReportError;
use crate::utils::ensure_dir_exists;
use log::{error, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

/// Persists summary statistics as a CSV report.
///
/// The report has one row per original column and one column per statistic;
/// it is overwritten on every run (single-writer model). Parent directories
/// of the output path are created as needed.
#[derive(Debug, Clone)]
pub struct SummarySaver {
    output_path: PathBuf,
}

impl SummarySaver {
    pub fn new(output_path: impl Into<PathBuf>) -> SummarySaver {
        SummarySaver {
            output_path: output_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    /// Writes `stats` to the configured output path.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::CreateDir`] if a parent directory cannot be
    /// created, [`ReportError::WriteIo`] on file creation failures and
    /// [`ReportError::CsvWrite`] if the CSV encoder fails.
    pub async fn save_summary(&self, stats: &SummaryStatistics) -> Result<(), ReportError> {
        if let Some(parent) = self
            .output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            ensure_dir_exists(parent)
                .await
                .map_err(|e| ReportError::CreateDir(parent.to_path_buf(), e))?;
        }

        let mut df = stats
            .to_frame()
            .map_err(|e| ReportError::CsvWrite(self.output_path.clone(), e))?;
        let path = self.output_path.clone();

        let written = task::spawn_blocking(move || {
            let mut file = std::fs::File::create(&path)
                .map_err(|e| ReportError::WriteIo(path.clone(), e))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .map_err(|e| ReportError::CsvWrite(path.clone(), e))?;
            Ok::<PathBuf, ReportError>(path)
        })
        .await?;

        match written {
            Ok(path) => {
                info!("Weather summary saved to '{}'", path.display());
                Ok(())
            }
            Err(e) => {
                error!("Failed to save weather summary - {e}");
                Err(e)
            }
        }
    }

    /// Reads a report previously written by [`SummarySaver::save_summary`]
    /// back into [`SummaryStatistics`].
    pub async fn load_summary(path: &Path) -> Result<SummaryStatistics, ReportError> {
        let path_owned = path.to_path_buf();
        task::spawn_blocking(move || {
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path_owned.clone()))
                .map_err(|e| ReportError::CsvRead(path_owned.clone(), e))?
                .finish()
                .map_err(|e| ReportError::CsvRead(path_owned.clone(), e))?;
            SummaryStatistics::from_frame(&df)
                .map_err(|e| ReportError::CsvRead(path_owned, e))
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> SummaryStatistics {
        let df = df!(
            "MinTemp" => [8.0, 15.0, 5.0, 20.0],
            "Rainfall" => [Some(5.0), Some(10.0), None, Some(20.0)],
            "Location" => ["Albury", "Albury", "Sydney", "Albury"],
        )
        .unwrap();
        SummaryStatistics::describe(&df, None).unwrap()
    }

    #[tokio::test]
    async fn save_then_load_reproduces_values() -> Result<(), ReportError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let stats = sample_stats();

        let saver = SummarySaver::new(&path);
        saver.save_summary(&stats).await?;
        assert!(path.exists());

        let reloaded = SummarySaver::load_summary(&path).await?;
        assert_eq!(reloaded.categorical, stats.categorical);
        assert_eq!(reloaded.numeric.len(), stats.numeric.len());
        for (a, b) in reloaded.numeric.iter().zip(&stats.numeric) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.count, b.count);
            assert!((a.mean - b.mean).abs() < 1e-9);
            assert!((a.std - b.std).abs() < 1e-9);
            assert!((a.min - b.min).abs() < 1e-9);
            assert!((a.q25 - b.q25).abs() < 1e-9);
            assert!((a.median - b.median).abs() < 1e-9);
            assert!((a.q75 - b.q75).abs() < 1e-9);
            assert!((a.max - b.max).abs() < 1e-9);
        }
        Ok(())
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() -> Result<(), ReportError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("summary.csv");

        SummarySaver::new(&path).save_summary(&sample_stats()).await?;
        assert!(path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn unwritable_target_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        // The target's parent is a file, so directory creation must fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("summary.csv");

        let err = SummarySaver::new(&path)
            .save_summary(&sample_stats())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::CreateDir(..)));
    }
}
