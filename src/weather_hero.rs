//! This module provides the main entry point for processing weather data.
//! It composes the loader, the analyzer and the saver into one pipeline:
//! load -> analyze -> group-reduce -> save, with an optional chart pass.

use crate::analysis::analyzer::WeatherAnalyzer;
use crate::analysis::grouped::GroupTotals;
use crate::analysis::summary::SummaryStatistics;
use crate::error::WeatherHeroError;
use crate::loading::error::LoadError;
use crate::loading::loader::WeatherLoader;
use crate::reporting::saver::SummarySaver;
use crate::types::schema::SchemaConfig;
use bon::bon;
use log::{error, info};
use polars::frame::DataFrame;
use std::path::PathBuf;
use tokio::task::JoinHandle;

const DEFAULT_GROUP_KEY: &str = "Location";
const DEFAULT_GROUP_TARGET: &str = "Rainfall";

#[cfg(feature = "charts")]
const WIND_DIR_COLUMN: &str = "WindGustDir";
#[cfg(feature = "charts")]
const WIND_SPEED_COLUMN: &str = "WindGustSpeed";
#[cfg(feature = "charts")]
const MAX_TEMP_COLUMN: &str = "MaxTemp";
#[cfg(feature = "charts")]
const MIN_TEMP_COLUMN: &str = "MinTemp";
#[cfg(feature = "charts")]
const HOT_DAY_MAX_TEMP: f64 = 30.0;
#[cfg(feature = "charts")]
const COLD_DAY_MIN_TEMP: f64 = 10.0;

/// Everything one pipeline run produced: the per-column statistics, the
/// grouped totals, and the analyzer (still holding the loaded table) for
/// further ad hoc queries.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub statistics: SummaryStatistics,
    pub group_totals: GroupTotals,
    pub analyzer: WeatherAnalyzer,
}

/// Loads and analyzes weather data and saves summary statistics.
///
/// Create an instance with the builder, then run [`WeatherHero::process`]
/// for the whole pipeline, or drive the steps yourself via
/// [`WeatherHero::spawn_load`] and [`WeatherHero::process_frame`].
///
/// # Examples
///
/// ```rust
/// use std::path::PathBuf;
/// use weather_hero::{WeatherHero, WeatherHeroError};
///
/// # async fn run() -> Result<(), WeatherHeroError> {
/// let hero = WeatherHero::builder()
///     .data_path(PathBuf::from("data/weather_test.csv"))
///     .output_path(PathBuf::from("data/weather_summary.csv"))
///     .build();
///
/// let report = hero.process().await?;
/// println!("{} rainfall records", report.statistics.numeric.len());
/// # Ok(())
/// # }
/// ```
pub struct WeatherHero {
    loader: WeatherLoader,
    saver: SummarySaver,
    schema: Option<SchemaConfig>,
    group_key: String,
    group_target: String,
}

#[bon]
impl WeatherHero {
    /// Creates a new `WeatherHero`.
    ///
    /// # Arguments
    ///
    /// * `.data_path(PathBuf)`: **Required.** The CSV file to load.
    /// * `.output_path(PathBuf)`: **Required.** Where the summary CSV is written.
    /// * `.schema(SchemaConfig)`: Optional. Declared column roles, overriding
    ///   dtype inference.
    /// * `.group_key(String)`: Optional. Key column for the grouped
    ///   reduction. Defaults to `Location`.
    /// * `.group_target(String)`: Optional. Numeric column summed per group.
    ///   Defaults to `Rainfall`.
    #[builder]
    pub fn new(
        data_path: PathBuf,
        output_path: PathBuf,
        schema: Option<SchemaConfig>,
        group_key: Option<String>,
        group_target: Option<String>,
    ) -> WeatherHero {
        WeatherHero {
            loader: WeatherLoader::new(data_path),
            saver: SummarySaver::new(output_path),
            schema,
            group_key: group_key.unwrap_or_else(|| DEFAULT_GROUP_KEY.to_string()),
            group_target: group_target.unwrap_or_else(|| DEFAULT_GROUP_TARGET.to_string()),
        }
    }
}

impl WeatherHero {
    /// Starts the load as a background task and returns its handle.
    ///
    /// Callers can overlap independent setup work with the file read;
    /// aggregation must wait on the handle (the dependency barrier) and pass
    /// the loaded frame to [`WeatherHero::process_frame`].
    pub fn spawn_load(&self) -> JoinHandle<Result<DataFrame, LoadError>> {
        let loader = self.loader.clone();
        tokio::spawn(async move { loader.load_frame().await })
    }

    /// Runs the whole pipeline: load -> analyze -> group-reduce -> save.
    ///
    /// The load runs as a background task; every later step waits for its
    /// result. The first error halts the pipeline, nothing partial is
    /// written, and start/success/failure are logged.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherHeroError::Load`] variants for missing, wrongly
    /// typed or unparseable input, [`WeatherHeroError::Analysis`] variants
    /// for absent columns or undefined statistics, and
    /// [`WeatherHeroError::Report`] variants when the summary cannot be
    /// persisted.
    pub async fn process(&self) -> Result<WeatherReport, WeatherHeroError> {
        info!(
            "Weather pipeline started for '{}'",
            self.loader.path().display()
        );
        match self.run_pipeline().await {
            Ok(report) => {
                info!(
                    "Weather pipeline finished, summary at '{}'",
                    self.saver.path().display()
                );
                Ok(report)
            }
            Err(e) => {
                error!("Weather pipeline was terminated by the following error - {e}");
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self) -> Result<WeatherReport, WeatherHeroError> {
        let load = self.spawn_load();
        let df = load.await??;
        self.process_frame(df).await
    }

    /// Analyzes an already loaded frame and saves the summary.
    pub async fn process_frame(&self, df: DataFrame) -> Result<WeatherReport, WeatherHeroError> {
        let analyzer = WeatherAnalyzer::new(df);
        let statistics = analyzer.summary_statistics(self.schema.as_ref())?;
        let group_totals = analyzer.group_totals(&self.group_key, &self.group_target)?;
        self.saver.save_summary(&statistics).await?;
        Ok(WeatherReport {
            statistics,
            group_totals,
            analyzer,
        })
    }

    /// Renders the weather charts for a processed report into `plot_dir`
    /// and returns the written paths: the grouped totals, the grand total,
    /// average wind gust speed per direction, and mean rainfall on hot vs
    /// cold days.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherHeroError::Analysis`] if a chart column is absent
    /// from the table and [`WeatherHeroError::Report`] if the plot
    /// directory or a chart file cannot be written.
    #[cfg(feature = "charts")]
    pub async fn render_charts(
        &self,
        report: &WeatherReport,
        plot_dir: &std::path::Path,
    ) -> Result<Vec<PathBuf>, WeatherHeroError> {
        use crate::analysis::analyzer::Threshold;
        use crate::reporting::charts;
        use crate::reporting::error::ReportError;

        crate::utils::ensure_dir_exists(plot_dir)
            .await
            .map_err(|e| ReportError::CreateDir(plot_dir.to_path_buf(), e))?;

        let mut paths = Vec::with_capacity(4);

        paths.push(charts::render_group_totals(
            &report.group_totals,
            &self.group_key,
            &self.group_target,
            &format!("Total {} by {}", self.group_target, self.group_key),
            &plot_dir.join("group_totals.html"),
        )?);

        paths.push(charts::render_labeled_values(
            &[(self.group_target.as_str(), report.group_totals.grand_total())],
            &self.group_target,
            &format!("Total {} on Record", self.group_target),
            &plot_dir.join("total_rainfall.html"),
        )?);

        let wind = report
            .analyzer
            .paired_columns(WIND_DIR_COLUMN, WIND_SPEED_COLUMN)?;
        let wind_means = GroupTotals::from_frame(&wind, WIND_DIR_COLUMN, WIND_SPEED_COLUMN)?;
        paths.push(charts::render_group_means(
            &wind_means,
            WIND_DIR_COLUMN,
            WIND_SPEED_COLUMN,
            "Average Wind Gust Speed by Direction",
            &plot_dir.join("avg_windspeed.html"),
        )?);

        let hot = report
            .analyzer
            .mean_where(&self.group_target, MAX_TEMP_COLUMN, Threshold::Above(HOT_DAY_MAX_TEMP))?;
        let cold = report
            .analyzer
            .mean_where(&self.group_target, MIN_TEMP_COLUMN, Threshold::Below(COLD_DAY_MIN_TEMP))?;
        paths.push(charts::render_labeled_values(
            &[("Hot Days", hot), ("Cold Days", cold)],
            "avg_rainfall",
            "Average Rainfall: Hot vs Cold Days",
            &plot_dir.join("avg_rainfall.html"),
        )?);

        Ok(paths)
    }
}
