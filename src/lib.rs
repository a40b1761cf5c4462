mod analysis;
mod error;
mod loading;
mod reporting;
mod types;
mod utils;
mod weather_hero;

pub use error::WeatherHeroError;
pub use weather_hero::*;

pub use analysis::analyzer::{Threshold, WeatherAnalyzer};
pub use analysis::error::AnalysisError;
pub use analysis::grouped::{GroupAccumulator, GroupTotals};
pub use analysis::summary::{CategoricalColumnSummary, NumericColumnSummary, SummaryStatistics};

pub use loading::batches::RowBatches;
pub use loading::error::LoadError;
pub use loading::loader::WeatherLoader;

pub use reporting::error::ReportError;
pub use reporting::saver::SummarySaver;

#[cfg(feature = "charts")]
pub use reporting::charts::{
    render_bar_chart, render_group_means, render_group_totals, render_labeled_values,
};

pub use types::schema::{ColumnRole, SchemaConfig};
