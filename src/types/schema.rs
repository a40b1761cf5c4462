//! Defines column roles (numeric vs categorical) and the optional schema
//! configuration that declares them, overriding dtype inference.

use crate::loading::error::LoadError;
use polars::prelude::DataType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// How a column participates in summarization.
///
/// Numeric columns get descriptive statistics (count, mean, std, quartiles,
/// min/max); categorical columns get count, distinct count and the mode.
///
/// # Examples
///
/// ```
/// use weather_hero::ColumnRole;
///
/// assert_eq!(format!("{}", ColumnRole::Numeric), "numeric");
/// assert_eq!(ColumnRole::Categorical.to_string(), "categorical");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Numeric => write!(f, "numeric"),
            ColumnRole::Categorical => write!(f, "categorical"),
        }
    }
}

/// Infers a column's role from its polars dtype.
///
/// Integer and float columns are numeric, string and boolean columns are
/// categorical. Columns of any other dtype take no part in summarization
/// unless a [`SchemaConfig`] declares a role for them.
pub(crate) fn infer_role(dtype: &DataType) -> Option<ColumnRole> {
    match dtype {
        DataType::Float64
        | DataType::Float32
        | DataType::Int64
        | DataType::Int32
        | DataType::Int16
        | DataType::Int8
        | DataType::UInt64
        | DataType::UInt32
        | DataType::UInt16
        | DataType::UInt8 => Some(ColumnRole::Numeric),
        DataType::String | DataType::Boolean => Some(ColumnRole::Categorical),
        _ => None,
    }
}

/// Declared per-column roles, loaded from a JSON file.
///
/// A declared role wins over dtype inference, so a numeric-looking column can
/// be summarized as categorical (e.g. station ids) and a string column with
/// stray non-numeric cells can still be treated as numeric (unparseable cells
/// become missing values).
///
/// The file maps column names to `"numeric"` or `"categorical"`:
///
/// ```json
/// { "columns": { "Location": "categorical", "Rainfall": "numeric" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub columns: HashMap<String, ColumnRole>,
}

impl SchemaConfig {
    /// Loads a `SchemaConfig` from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ConfigIo`] if the file cannot be read and
    /// [`LoadError::ConfigParse`] if it is not valid JSON of this shape.
    pub fn from_json_file(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::ConfigIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| LoadError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// The role for `name`: the declared role if any, otherwise inferred
    /// from `dtype`.
    pub fn role_of(&self, name: &str, dtype: &DataType) -> Option<ColumnRole> {
        self.columns.get(name).copied().or_else(|| infer_role(dtype))
    }
}
