use crate::analysis::error::AnalysisError;
use polars::prelude::*;
use std::collections::HashMap;

/// Running sum and non-missing count of the target column for one group.
///
/// Merging is component-wise addition, which is commutative and associative,
/// so partial accumulators built from any batching of the same rows combine
/// to the same result in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupAccumulator {
    pub sum: f64,
    pub count: u64,
}

impl GroupAccumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn combine(&mut self, other: GroupAccumulator) {
        self.sum += other.sum;
        self.count += other.count;
    }
}

/// A grouped reduction: per-key totals of a numeric target column.
///
/// Built either in one pass over a whole table
/// ([`GroupTotals::from_frame`]) or incrementally from row batches
/// ([`GroupTotals::accumulate`] / [`GroupTotals::merge`]). Missing target
/// values are ignored; rows with a missing key are skipped.
///
/// # Examples
///
/// ```
/// use polars::prelude::*;
/// use weather_hero::GroupTotals;
///
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let df = df!(
///     "Location" => ["A", "A", "B"],
///     "Rainfall" => [Some(1.0), None, Some(3.0)],
/// )?;
/// let totals = GroupTotals::from_frame(&df, "Location", "Rainfall")?;
/// assert_eq!(totals.total("A"), Some(1.0));
/// assert_eq!(totals.total("B"), Some(3.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTotals {
    groups: HashMap<String, GroupAccumulator>,
}

impl GroupTotals {
    pub fn new() -> GroupTotals {
        GroupTotals::default()
    }

    /// Builds totals for a whole table in one pass.
    pub fn from_frame(df: &DataFrame, key: &str, target: &str) -> Result<GroupTotals, AnalysisError> {
        let mut totals = GroupTotals::new();
        totals.accumulate(df, key, target)?;
        Ok(totals)
    }

    /// Folds one table (or batch) into this accumulator.
    ///
    /// The key column is read as text and the target column as `Float64`
    /// (unparseable cells become missing and are ignored, as are rows whose
    /// key is missing).
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SchemaMismatch`] if either column is absent
    /// and [`AnalysisError::NotNumeric`] if the target cannot be read as
    /// numbers at all.
    pub fn accumulate(
        &mut self,
        df: &DataFrame,
        key: &str,
        target: &str,
    ) -> Result<(), AnalysisError> {
        let keys = require_column(df, key)?
            .cast(&DataType::String)
            .map_err(AnalysisError::DataFrameProcessing)?;
        let values = require_column(df, target)?
            .cast(&DataType::Float64)
            .map_err(|e| AnalysisError::NotNumeric {
                column: target.to_string(),
                source: e,
            })?;

        let keys = keys.str().map_err(AnalysisError::DataFrameProcessing)?;
        let values = values.f64().map_err(AnalysisError::DataFrameProcessing)?;

        for (group, value) in keys.into_iter().zip(values) {
            let Some(group) = group else { continue };
            let entry = self.groups.entry(group.to_string()).or_default();
            if let Some(value) = value {
                entry.add(value);
            }
        }
        Ok(())
    }

    /// Combines two partial reductions; order of operands is irrelevant.
    pub fn merge(mut self, other: GroupTotals) -> GroupTotals {
        for (group, accumulator) in other.groups {
            self.groups.entry(group).or_default().combine(accumulator);
        }
        self
    }

    /// The summed target for `key`, if the group was seen.
    pub fn total(&self, key: &str) -> Option<f64> {
        self.groups.get(key).map(|a| a.sum)
    }

    /// The mean target for `key`; `None` for unseen groups and for groups
    /// with no non-missing values.
    pub fn mean(&self, key: &str) -> Option<f64> {
        self.groups
            .get(key)
            .filter(|a| a.count > 0)
            .map(|a| a.sum / a.count as f64)
    }

    /// Sum over all groups.
    pub fn grand_total(&self) -> f64 {
        self.groups.values().map(|a| a.sum).sum()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// `(key, total)` pairs sorted by key, for deterministic output.
    pub fn totals(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = self
            .groups
            .iter()
            .map(|(k, a)| (k.clone(), a.sum))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    /// `(key, mean)` pairs sorted by key, skipping groups with no values.
    pub fn means(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = self
            .groups
            .iter()
            .filter(|(_, a)| a.count > 0)
            .map(|(k, a)| (k.clone(), a.sum / a.count as f64))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    /// Two-column frame (`key`, `total`) sorted by key, for reports and
    /// charts.
    pub fn to_frame(&self, key_name: &str, total_name: &str) -> PolarsResult<DataFrame> {
        let (keys, sums): (Vec<String>, Vec<f64>) = self.totals().into_iter().unzip();
        df!(
            key_name => keys,
            total_name => sums,
        )
    }
}

pub(crate) fn require_column<'a>(
    df: &'a DataFrame,
    name: &str,
) -> Result<&'a Column, AnalysisError> {
    df.column(name).map_err(|_| AnalysisError::SchemaMismatch {
        column: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rainfall_frame() -> DataFrame {
        df!(
            "Location" => ["A", "A", "B"],
            "Rainfall" => [Some(1.0), None, Some(3.0)],
        )
        .unwrap()
    }

    #[test]
    fn sums_per_group_ignoring_missing() -> Result<(), AnalysisError> {
        let totals = GroupTotals::from_frame(&rainfall_frame(), "Location", "Rainfall")?;
        assert_eq!(totals.total("A"), Some(1.0));
        assert_eq!(totals.total("B"), Some(3.0));
        assert_eq!(totals.total("C"), None);
        assert_eq!(totals.grand_total(), 4.0);
        Ok(())
    }

    #[test]
    fn merge_of_partial_sums_is_order_independent() -> Result<(), AnalysisError> {
        let df = df!(
            "Location" => ["A", "B", "A", "B", "A"],
            "Rainfall" => [5.0, 10.0, 0.0, 20.0, 2.5],
        )
        .unwrap();

        let whole = GroupTotals::from_frame(&df, "Location", "Rainfall")?;

        // Any batching of the same rows, merged in any order, matches the
        // single-pass result.
        for split in 1..df.height() {
            let first = df.slice(0, split);
            let second = df.slice(split as i64, df.height() - split);

            let a = GroupTotals::from_frame(&first, "Location", "Rainfall")?;
            let b = GroupTotals::from_frame(&second, "Location", "Rainfall")?;

            assert_eq!(a.clone().merge(b.clone()), whole);
            assert_eq!(b.merge(a), whole);
        }
        Ok(())
    }

    #[test]
    fn rows_with_missing_keys_are_skipped() -> Result<(), AnalysisError> {
        let df = df!(
            "Location" => [Some("A"), None, Some("B")],
            "Rainfall" => [1.0, 100.0, 3.0],
        )
        .unwrap();

        let totals = GroupTotals::from_frame(&df, "Location", "Rainfall")?;
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.grand_total(), 4.0);
        Ok(())
    }

    #[test]
    fn group_means_follow_non_missing_counts() -> Result<(), AnalysisError> {
        let df = df!(
            "WindGustDir" => ["N", "E", "N", "E"],
            "WindGustSpeed" => [40.0, 30.0, 50.0, 40.0],
        )
        .unwrap();

        let totals = GroupTotals::from_frame(&df, "WindGustDir", "WindGustSpeed")?;
        assert_eq!(totals.mean("N"), Some(45.0));
        assert_eq!(totals.mean("E"), Some(35.0));
        assert_eq!(
            totals.means(),
            vec![("E".to_string(), 35.0), ("N".to_string(), 45.0)]
        );
        Ok(())
    }

    #[test]
    fn absent_columns_are_schema_mismatch() {
        let err = GroupTotals::from_frame(&rainfall_frame(), "Nowhere", "Rainfall").unwrap_err();
        assert!(matches!(err, AnalysisError::SchemaMismatch { .. }));
    }
}
