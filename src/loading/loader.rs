use crate::loading::batches::RowBatches;
use crate::loading::error::LoadError;
use log::{error, info};
use polars::frame::DataFrame;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::{fs, task};

/// Loads weather data from a delimited text file into a polars [`DataFrame`].
///
/// The loader is constructed with a default path; every load can either use
/// that path or override it. Two access modes are offered: a whole-table load
/// ([`WeatherLoader::load_frame`]) and a batched, forward-only iteration
/// ([`WeatherLoader::batched`]) for files that should be processed in one
/// pass without materializing the whole table.
#[derive(Debug, Clone)]
pub struct WeatherLoader {
    default_path: PathBuf,
}

impl WeatherLoader {
    pub fn new(default_path: impl Into<PathBuf>) -> WeatherLoader {
        WeatherLoader {
            default_path: default_path.into(),
        }
    }

    /// The path loads default to.
    pub fn path(&self) -> &Path {
        &self.default_path
    }

    /// Loads the default file as a fully materialized `DataFrame`.
    ///
    /// # Errors
    ///
    /// See [`WeatherLoader::load_frame_from`].
    pub async fn load_frame(&self) -> Result<DataFrame, LoadError> {
        self.load_frame_from(&self.default_path).await
    }

    /// Loads `path` as a fully materialized `DataFrame`.
    ///
    /// Failure kinds, checked in order:
    /// - [`LoadError::UnsupportedExtension`] when the path is not a `.csv` file,
    /// - [`LoadError::FileNotFound`] when the file does not exist,
    /// - [`LoadError::CsvParse`] when the content cannot be parsed,
    /// - [`LoadError::NotDelimited`] when parsing yields fewer than two columns.
    ///
    /// Parsing runs on a blocking worker thread; one log entry is emitted on
    /// success and on each failure kind.
    pub async fn load_frame_from(&self, path: &Path) -> Result<DataFrame, LoadError> {
        check_extension(path)?;

        if fs::metadata(path).await.is_err() {
            error!("File error: '{}' not found", path.display());
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }

        let path_owned = path.to_path_buf();
        let df = task::spawn_blocking(move || {
            CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path_owned.clone()))
                .map_err(|e| LoadError::CsvParse {
                    path: path_owned.clone(),
                    source: e,
                })?
                .finish()
                .map_err(|e| LoadError::CsvParse {
                    path: path_owned,
                    source: e,
                })
        })
        .await?;

        let df = match df {
            Ok(df) => df,
            Err(e) => {
                error!("CSV parsing error: {e}");
                return Err(e);
            }
        };

        if df.width() < 2 {
            error!(
                "CSV parsing error: '{}' produced a single column",
                path.display()
            );
            return Err(LoadError::NotDelimited(path.to_path_buf()));
        }

        info!(
            "Successfully read {} rows from '{}'",
            df.height(),
            path.display()
        );
        Ok(df)
    }

    /// Loads the default file through the batched reader, stitching the
    /// batches back into one `DataFrame`.
    ///
    /// Same result as [`WeatherLoader::load_frame`] for well-formed input;
    /// useful when batch sizing should bound peak parse memory.
    pub async fn load_frame_batched(&self, batch_size: usize) -> Result<DataFrame, LoadError> {
        let loader = self.clone();
        task::spawn_blocking(move || {
            let batches = loader.batched(batch_size)?;
            let mut table: Option<DataFrame> = None;
            for batch in batches {
                let batch = batch?;
                table = Some(match table {
                    None => batch,
                    Some(mut df) => {
                        df.vstack_mut(&batch).map_err(|e| LoadError::CsvParse {
                            path: loader.default_path.clone(),
                            source: e,
                        })?;
                        df
                    }
                });
            }
            table.ok_or_else(|| LoadError::CsvParse {
                path: loader.default_path.clone(),
                source: PolarsError::NoData("CSV contains no data rows".into()),
            })
        })
        .await?
    }

    /// Opens the default file for batched iteration.
    ///
    /// Path checks (extension, existence, delimited header) run here, so a
    /// bad path fails before the first batch is requested. The returned
    /// iterator yields `DataFrame` batches of up to `batch_size` rows, in
    /// file order, and can be exhausted exactly once.
    ///
    /// # Errors
    ///
    /// Returns the same kinds as [`WeatherLoader::load_frame_from`] for path
    /// and header problems; per-batch parse failures surface as items of the
    /// iterator.
    pub fn batched(&self, batch_size: usize) -> Result<RowBatches, LoadError> {
        check_extension(&self.default_path)?;
        RowBatches::open(&self.default_path, batch_size)
    }
}

fn check_extension(path: &Path) -> Result<(), LoadError> {
    if path.extension().and_then(|e| e.to_str()) != Some("csv") {
        error!("Unsupported file type: '{}'", path.display());
        return Err(LoadError::UnsupportedExtension(path.to_path_buf()));
    }
    Ok(())
}
