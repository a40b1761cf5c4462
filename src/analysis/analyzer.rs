use crate::analysis::error::AnalysisError;
use crate::analysis::grouped::{require_column, GroupTotals};
use crate::analysis::summary::SummaryStatistics;
use crate::types::schema::SchemaConfig;
use log::info;
use polars::prelude::*;

/// A threshold predicate for filter-then-aggregate queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Keep rows where the filter column is strictly greater than the value.
    Above(f64),
    /// Keep rows where the filter column is strictly less than the value.
    Below(f64),
}

impl Threshold {
    fn predicate(self, column: &str) -> Expr {
        match self {
            Threshold::Above(value) => col(column).gt(lit(value)),
            Threshold::Below(value) => col(column).lt(lit(value)),
        }
    }
}

/// Analyzes a loaded weather table.
///
/// All operations are pure reads over the in-memory frame; the analyzer
/// never mutates its table.
#[derive(Debug, Clone)]
pub struct WeatherAnalyzer {
    df: DataFrame,
}

impl WeatherAnalyzer {
    pub fn new(df: DataFrame) -> WeatherAnalyzer {
        WeatherAnalyzer { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    /// Per-column descriptive statistics; see [`SummaryStatistics::describe`].
    pub fn summary_statistics(
        &self,
        config: Option<&SchemaConfig>,
    ) -> Result<SummaryStatistics, AnalysisError> {
        let stats = SummaryStatistics::describe(&self.df, config)?;
        info!(
            "Successfully generated summary statistics on {} numeric and {} categorical columns",
            stats.numeric.len(),
            stats.categorical.len()
        );
        Ok(stats)
    }

    /// Sums `target` per distinct value of `key`; see [`GroupTotals`].
    pub fn group_totals(&self, key: &str, target: &str) -> Result<GroupTotals, AnalysisError> {
        GroupTotals::from_frame(&self.df, key, target)
    }

    /// Mean of `target` over the rows where `column` passes `threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SchemaMismatch`] if either column is absent
    /// and [`AnalysisError::UndefinedStatistic`] if no row passes the filter
    /// or every passing row has a missing target.
    pub fn mean_where(
        &self,
        target: &str,
        column: &str,
        threshold: Threshold,
    ) -> Result<f64, AnalysisError> {
        require_column(&self.df, target)?;
        require_column(&self.df, column)?;

        let row = self
            .df
            .clone()
            .lazy()
            .filter(threshold.predicate(column))
            .select([col(target).cast(DataType::Float64).mean().alias("mean")])
            .collect()?;

        row.column("mean")?
            .f64()?
            .get(0)
            .ok_or(AnalysisError::UndefinedStatistic {
                column: target.to_string(),
                statistic: "mean",
            })
    }

    /// Pairs two columns element-wise into a fresh two-column frame, e.g.
    /// wind direction with gust speed for downstream charting.
    pub fn paired_columns(&self, x: &str, y: &str) -> Result<DataFrame, AnalysisError> {
        require_column(&self.df, x)?;
        require_column(&self.df, y)?;
        self.df
            .select([x, y])
            .map_err(AnalysisError::DataFrameProcessing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_frame() -> DataFrame {
        df!(
            "MaxTemp" => [35.0, 28.0, 33.0, 18.0],
            "MinTemp" => [15.0, 8.0, 20.0, 5.0],
            "Rainfall" => [5.0, 10.0, 0.0, 20.0],
            "WindGustDir" => ["N", "E", "N", "E"],
            "WindGustSpeed" => [40.0, 30.0, 50.0, 40.0],
        )
        .unwrap()
    }

    #[test]
    fn mean_rainfall_on_hot_and_cold_days() -> Result<(), AnalysisError> {
        let analyzer = WeatherAnalyzer::new(weather_frame());

        let hot = analyzer.mean_where("Rainfall", "MaxTemp", Threshold::Above(30.0))?;
        let cold = analyzer.mean_where("Rainfall", "MinTemp", Threshold::Below(10.0))?;

        assert_eq!(hot, 2.5); // (5 + 0) / 2
        assert_eq!(cold, 15.0); // (10 + 20) / 2
        Ok(())
    }

    #[test]
    fn empty_selection_is_undefined() {
        let analyzer = WeatherAnalyzer::new(weather_frame());
        let err = analyzer
            .mean_where("Rainfall", "MaxTemp", Threshold::Above(100.0))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UndefinedStatistic { .. }));
    }

    #[test]
    fn missing_filter_column_is_schema_mismatch() {
        let analyzer = WeatherAnalyzer::new(weather_frame());
        let err = analyzer
            .mean_where("Rainfall", "Sunshine", Threshold::Above(1.0))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::SchemaMismatch { .. }));
    }

    #[test]
    fn paired_columns_keep_row_order() -> Result<(), AnalysisError> {
        let analyzer = WeatherAnalyzer::new(weather_frame());
        let pairs = analyzer.paired_columns("WindGustDir", "WindGustSpeed")?;

        assert_eq!(pairs.shape(), (4, 2));
        assert_eq!(pairs.get_column_names(), ["WindGustDir", "WindGustSpeed"]);

        let totals = GroupTotals::from_frame(&pairs, "WindGustDir", "WindGustSpeed")?;
        assert_eq!(totals.mean("N"), Some(45.0));
        Ok(())
    }
}
