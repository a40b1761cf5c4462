//! Chart rendering over in-memory analysis results.
//!
//! Charts are written as standalone HTML files so they can be produced from
//! a non-interactive (server) context; nothing here opens a window.

use crate::analysis::grouped::GroupTotals;
use crate::reporting::error::ReportError;
use log::info;
use plotlars::{BarPlot, Plot, Text};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Renders a bar chart of the `values` column keyed by the `labels` column
/// and writes it to `path`.
///
/// Parent directories are created as needed.
pub fn render_bar_chart(
    df: &DataFrame,
    labels: &str,
    values: &str,
    title: &str,
    path: &Path,
) -> Result<PathBuf, ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ReportError::CreateDir(parent.to_path_buf(), e))?;
    }

    BarPlot::builder()
        .data(df)
        .labels(labels)
        .values(values)
        .plot_title(Text::from(title))
        .x_title(Text::from(labels))
        .y_title(Text::from(values))
        .build()
        .write_html(path.to_string_lossy().to_string());

    info!("Chart '{}' written to '{}'", title, path.display());
    Ok(path.to_path_buf())
}

/// Bar chart of per-group totals (e.g. total rainfall by location).
pub fn render_group_totals(
    totals: &GroupTotals,
    key_name: &str,
    total_name: &str,
    title: &str,
    path: &Path,
) -> Result<PathBuf, ReportError> {
    let df = totals
        .to_frame(key_name, total_name)
        .map_err(|e| ReportError::ChartData(path.to_path_buf(), e))?;
    render_bar_chart(&df, key_name, total_name, title, path)
}

/// Bar chart of per-group means (e.g. average wind gust speed by direction).
pub fn render_group_means(
    totals: &GroupTotals,
    key_name: &str,
    mean_name: &str,
    title: &str,
    path: &Path,
) -> Result<PathBuf, ReportError> {
    let (keys, means): (Vec<String>, Vec<f64>) = totals.means().into_iter().unzip();
    let df = df!(
        key_name => keys,
        mean_name => means,
    )
    .map_err(|e| ReportError::ChartData(path.to_path_buf(), e))?;
    render_bar_chart(&df, key_name, mean_name, title, path)
}

/// Bar chart of a handful of labeled values (e.g. mean rainfall on hot vs
/// cold days).
pub fn render_labeled_values(
    pairs: &[(&str, f64)],
    value_name: &str,
    title: &str,
    path: &Path,
) -> Result<PathBuf, ReportError> {
    let labels: Vec<&str> = pairs.iter().map(|(label, _)| *label).collect();
    let values: Vec<f64> = pairs.iter().map(|(_, value)| *value).collect();
    let df = df!(
        "label" => labels,
        value_name => values,
    )
    .map_err(|e| ReportError::ChartData(path.to_path_buf(), e))?;
    render_bar_chart(&df, "label", value_name, title, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::error::AnalysisError;

    #[test]
    fn group_totals_chart_lands_on_disk() -> Result<(), AnalysisError> {
        let df = df!(
            "Location" => ["A", "A", "B"],
            "Rainfall" => [1.0, 2.0, 3.0],
        )
        .unwrap();
        let totals = GroupTotals::from_frame(&df, "Location", "Rainfall")?;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plots").join("total_rainfall.html");
        let written =
            render_group_totals(&totals, "Location", "Rainfall", "Total Rainfall", &path).unwrap();

        assert_eq!(written, path);
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn labeled_values_chart_lands_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avg_rainfall.html");

        render_labeled_values(
            &[("Hot Days", 2.5), ("Cold Days", 15.0)],
            "avg_rainfall",
            "Average Rainfall: Hot vs Cold Days",
            &path,
        )
        .unwrap();
        assert!(path.exists());
    }
}
