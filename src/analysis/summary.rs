use crate::analysis::error::AnalysisError;
use crate::types::schema::{ColumnRole, SchemaConfig};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Descriptive statistics for one numeric column, missing values excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnSummary {
    pub name: String,
    /// Count of non-missing values.
    pub count: u64,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1); 0.0 when only one value is present.
    pub std: f64,
    pub min: f64,
    /// 25th percentile, linear interpolation.
    pub q25: f64,
    pub median: f64,
    /// 75th percentile, linear interpolation.
    pub q75: f64,
    pub max: f64,
}

/// Descriptive statistics for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumnSummary {
    pub name: String,
    /// Count of non-missing values.
    pub count: u64,
    /// Count of distinct non-missing values.
    pub unique: u64,
    /// Most frequent value; ties broken by first appearance in column order.
    pub top: String,
    /// Frequency of `top`.
    pub top_freq: u64,
}

/// Per-column summary statistics derived once from a loaded table.
///
/// Immutable after creation; can be serialized to a one-row-per-column
/// report frame with [`SummaryStatistics::to_frame`] and read back with
/// [`SummaryStatistics::from_frame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub numeric: Vec<NumericColumnSummary>,
    pub categorical: Vec<CategoricalColumnSummary>,
}

impl SummaryStatistics {
    /// Computes summary statistics for every summarizable column of `df`.
    ///
    /// Column roles come from `config` where declared and from the dtype
    /// otherwise; columns with no role (e.g. dates) are skipped. Missing
    /// values are excluded from every statistic.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UndefinedStatistic`] if a summarized column
    /// has no non-missing values, and [`AnalysisError::DataFrameProcessing`]
    /// if polars fails underneath.
    pub fn describe(
        df: &DataFrame,
        config: Option<&SchemaConfig>,
    ) -> Result<SummaryStatistics, AnalysisError> {
        let default_config = SchemaConfig::default();
        let config = config.unwrap_or(&default_config);

        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for column in df.get_columns() {
            let name = column.name().as_str();
            match config.role_of(name, column.dtype()) {
                Some(ColumnRole::Numeric) => numeric.push(numeric_summary(df, name)?),
                Some(ColumnRole::Categorical) => {
                    categorical.push(categorical_summary(column)?)
                }
                None => continue,
            }
        }

        Ok(SummaryStatistics {
            numeric,
            categorical,
        })
    }

    /// Lays the statistics out as a report frame: one row per original
    /// column, one column per statistic. Cells that do not apply to a row's
    /// kind are null.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let total = self.numeric.len() + self.categorical.len();
        let mut names = Vec::with_capacity(total);
        let mut kinds = Vec::with_capacity(total);
        let mut counts = Vec::with_capacity(total);
        let mut means = Vec::with_capacity(total);
        let mut stds = Vec::with_capacity(total);
        let mut mins = Vec::with_capacity(total);
        let mut q25s = Vec::with_capacity(total);
        let mut medians = Vec::with_capacity(total);
        let mut q75s = Vec::with_capacity(total);
        let mut maxs = Vec::with_capacity(total);
        let mut uniques = Vec::with_capacity(total);
        let mut tops = Vec::with_capacity(total);
        let mut top_freqs = Vec::with_capacity(total);

        for s in &self.numeric {
            names.push(s.name.clone());
            kinds.push(ColumnRole::Numeric.to_string());
            counts.push(s.count);
            means.push(Some(s.mean));
            stds.push(Some(s.std));
            mins.push(Some(s.min));
            q25s.push(Some(s.q25));
            medians.push(Some(s.median));
            q75s.push(Some(s.q75));
            maxs.push(Some(s.max));
            uniques.push(None);
            tops.push(None);
            top_freqs.push(None);
        }
        for c in &self.categorical {
            names.push(c.name.clone());
            kinds.push(ColumnRole::Categorical.to_string());
            counts.push(c.count);
            means.push(None);
            stds.push(None);
            mins.push(None);
            q25s.push(None);
            medians.push(None);
            q75s.push(None);
            maxs.push(None);
            uniques.push(Some(c.unique));
            tops.push(Some(c.top.clone()));
            top_freqs.push(Some(c.top_freq));
        }

        df!(
            "column" => names,
            "kind" => kinds,
            "count" => counts,
            "mean" => means,
            "std" => stds,
            "min" => mins,
            "q25" => q25s,
            "median" => medians,
            "q75" => q75s,
            "max" => maxs,
            "unique" => uniques,
            "top" => tops,
            "top_freq" => top_freqs,
        )
    }

    /// Rebuilds `SummaryStatistics` from a report frame produced by
    /// [`SummaryStatistics::to_frame`] (possibly after a CSV round trip).
    pub fn from_frame(df: &DataFrame) -> PolarsResult<SummaryStatistics> {
        let names = df.column("column")?.str()?.clone();
        let kinds = df.column("kind")?.str()?.clone();

        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for idx in 0..df.height() {
            let name = names
                .get(idx)
                .ok_or_else(|| PolarsError::ComputeError("report row has no column name".into()))?;
            match kinds.get(idx) {
                Some("numeric") => numeric.push(NumericColumnSummary {
                    name: name.to_string(),
                    count: opt_count(df, "count", idx)
                        .ok_or_else(|| report_cell_error(name, "count"))?,
                    mean: opt_float(df, "mean", idx)
                        .ok_or_else(|| report_cell_error(name, "mean"))?,
                    std: opt_float(df, "std", idx).unwrap_or(0.0),
                    min: opt_float(df, "min", idx)
                        .ok_or_else(|| report_cell_error(name, "min"))?,
                    q25: opt_float(df, "q25", idx)
                        .ok_or_else(|| report_cell_error(name, "q25"))?,
                    median: opt_float(df, "median", idx)
                        .ok_or_else(|| report_cell_error(name, "median"))?,
                    q75: opt_float(df, "q75", idx)
                        .ok_or_else(|| report_cell_error(name, "q75"))?,
                    max: opt_float(df, "max", idx)
                        .ok_or_else(|| report_cell_error(name, "max"))?,
                }),
                Some("categorical") => categorical.push(CategoricalColumnSummary {
                    name: name.to_string(),
                    count: opt_count(df, "count", idx)
                        .ok_or_else(|| report_cell_error(name, "count"))?,
                    unique: opt_count(df, "unique", idx)
                        .ok_or_else(|| report_cell_error(name, "unique"))?,
                    top: opt_string(df, "top", idx)
                        .ok_or_else(|| report_cell_error(name, "top"))?,
                    top_freq: opt_count(df, "top_freq", idx)
                        .ok_or_else(|| report_cell_error(name, "top_freq"))?,
                }),
                other => {
                    return Err(PolarsError::ComputeError(
                        format!("unknown column kind {other:?} in report").into(),
                    ))
                }
            }
        }

        Ok(SummaryStatistics {
            numeric,
            categorical,
        })
    }
}

fn numeric_summary(df: &DataFrame, name: &str) -> Result<NumericColumnSummary, AnalysisError> {
    let target = col(name).cast(DataType::Float64);
    let row = df
        .clone()
        .lazy()
        .select([
            target.clone().count().cast(DataType::UInt64).alias("count"),
            target.clone().mean().alias("mean"),
            target.clone().std(1).alias("std"),
            target.clone().min().alias("min"),
            target
                .clone()
                .quantile(lit(0.25), QuantileMethod::Linear)
                .alias("q25"),
            target.clone().median().alias("median"),
            target
                .clone()
                .quantile(lit(0.75), QuantileMethod::Linear)
                .alias("q75"),
            target.max().alias("max"),
        ])
        .collect()?;

    let count = opt_count(&row, "count", 0).unwrap_or(0);
    if count == 0 {
        return Err(AnalysisError::UndefinedStatistic {
            column: name.to_string(),
            statistic: "mean",
        });
    }

    let stat = |stat_name: &'static str| -> Result<f64, AnalysisError> {
        opt_float(&row, stat_name, 0).ok_or(AnalysisError::UndefinedStatistic {
            column: name.to_string(),
            statistic: stat_name,
        })
    };

    Ok(NumericColumnSummary {
        name: name.to_string(),
        count,
        mean: stat("mean")?,
        std: opt_float(&row, "std", 0).unwrap_or(0.0),
        min: stat("min")?,
        q25: stat("q25")?,
        median: stat("median")?,
        q75: stat("q75")?,
        max: stat("max")?,
    })
}

fn categorical_summary(column: &Column) -> Result<CategoricalColumnSummary, AnalysisError> {
    let name = column.name().to_string();
    let casted = column
        .cast(&DataType::String)
        .map_err(AnalysisError::DataFrameProcessing)?;
    let values = casted.str().map_err(AnalysisError::DataFrameProcessing)?;

    let mut frequencies: HashMap<&str, u64> = HashMap::new();
    // Column order of first appearance, for deterministic mode tie-breaks.
    let mut first_seen: Vec<&str> = Vec::new();

    for value in values.into_iter().flatten() {
        let entry = frequencies.entry(value).or_insert(0);
        if *entry == 0 {
            first_seen.push(value);
        }
        *entry += 1;
    }

    let count: u64 = frequencies.values().sum();
    if count == 0 {
        return Err(AnalysisError::UndefinedStatistic {
            column: name,
            statistic: "mode",
        });
    }

    let mut top = "";
    let mut top_freq = 0;
    for value in &first_seen {
        let freq = frequencies[value];
        if freq > top_freq {
            top = value;
            top_freq = freq;
        }
    }

    Ok(CategoricalColumnSummary {
        name,
        count,
        unique: first_seen.len() as u64,
        top: top.to_string(),
        top_freq,
    })
}

// Tolerant cell readers: a report column that is all-null round-trips
// through CSV without a stable dtype, so probe the plausible ones.

fn opt_float(df: &DataFrame, name: &str, idx: usize) -> Option<f64> {
    let column = df.column(name).ok()?;
    column
        .f64()
        .ok()
        .and_then(|ca| ca.get(idx))
        .or_else(|| column.i64().ok().and_then(|ca| ca.get(idx)).map(|v| v as f64))
}

fn opt_count(df: &DataFrame, name: &str, idx: usize) -> Option<u64> {
    let column = df.column(name).ok()?;
    column
        .u64()
        .ok()
        .and_then(|ca| ca.get(idx))
        .or_else(|| {
            column
                .i64()
                .ok()
                .and_then(|ca| ca.get(idx))
                .and_then(|v| u64::try_from(v).ok())
        })
}

fn opt_string(df: &DataFrame, name: &str, idx: usize) -> Option<String> {
    let column = df.column(name).ok()?;
    let casted = column.cast(&DataType::String).ok()?;
    casted.str().ok()?.get(idx).map(|s| s.to_string())
}

fn report_cell_error(column: &str, stat: &str) -> PolarsError {
    PolarsError::ComputeError(format!("report cell '{stat}' missing for column '{column}'").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn numeric_summary_matches_reference_mean() -> Result<(), AnalysisError> {
        let df = df!(
            "temp" => [10.0, 20.0, 30.0],
            "humidity" => [50.0, 50.0, 70.0],
        )
        .unwrap();

        let stats = SummaryStatistics::describe(&df, None)?;
        let temp = &stats.numeric[0];
        let reference = (10.0 + 20.0 + 30.0) / 3.0;

        assert_eq!(temp.count, 3);
        assert!(close(temp.mean, reference));
        assert!(close(temp.std, 10.0));
        assert!(close(temp.min, 10.0));
        assert!(close(temp.q25, 15.0));
        assert!(close(temp.median, 20.0));
        assert!(close(temp.q75, 25.0));
        assert!(close(temp.max, 30.0));
        Ok(())
    }

    #[test]
    fn missing_values_are_excluded() -> Result<(), AnalysisError> {
        let df = df!(
            "Rainfall" => [Some(1.0), None, Some(3.0)],
            "Location" => ["A", "A", "B"],
        )
        .unwrap();

        let stats = SummaryStatistics::describe(&df, None)?;
        let rainfall = &stats.numeric[0];
        assert_eq!(rainfall.count, 2);
        assert!(close(rainfall.mean, 2.0));

        let location = &stats.categorical[0];
        assert_eq!(location.count, 3);
        assert_eq!(location.unique, 2);
        assert_eq!(location.top, "A");
        assert_eq!(location.top_freq, 2);
        Ok(())
    }

    #[test]
    fn mode_tie_breaks_on_first_appearance() -> Result<(), AnalysisError> {
        let df = df!(
            "condition" => ["rainy", "sunny", "rainy", "sunny"],
        )
        .unwrap();

        let stats = SummaryStatistics::describe(&df, None)?;
        assert_eq!(stats.categorical[0].top, "rainy");
        assert_eq!(stats.categorical[0].top_freq, 2);
        Ok(())
    }

    #[test]
    fn all_missing_numeric_column_is_undefined() {
        let df = df!(
            "Rainfall" => [None::<f64>, None, None],
        )
        .unwrap();

        let err = SummaryStatistics::describe(&df, None).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UndefinedStatistic { statistic: "mean", .. }
        ));
    }

    #[test]
    fn declared_role_reassigns_a_numeric_column() -> Result<(), AnalysisError> {
        let df = df!(
            "StationId" => [101i64, 101, 204],
            "Rainfall" => [1.0, 2.0, 3.0],
        )
        .unwrap();

        let mut config = SchemaConfig::default();
        config
            .columns
            .insert("StationId".to_string(), ColumnRole::Categorical);

        let stats = SummaryStatistics::describe(&df, Some(&config))?;
        assert_eq!(stats.numeric.len(), 1);
        assert_eq!(stats.numeric[0].name, "Rainfall");
        assert_eq!(stats.categorical.len(), 1);
        assert_eq!(stats.categorical[0].top, "101");
        Ok(())
    }

    #[test]
    fn report_frame_round_trips() -> Result<(), AnalysisError> {
        let df = df!(
            "temp" => [10.0, 20.0, 30.0],
            "condition" => ["sunny", "rainy", "sunny"],
        )
        .unwrap();

        let stats = SummaryStatistics::describe(&df, None)?;
        let frame = stats.to_frame()?;
        assert_eq!(frame.height(), 2);

        let reloaded = SummaryStatistics::from_frame(&frame)?;
        assert_eq!(reloaded, stats);
        Ok(())
    }
}
