//! CSV loading and column extraction using Polars.

use crate::error::{PlotError, Result};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Load a CSV file with header into a DataFrame.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    // Lazy scan, then collect once
    let df = LazyCsvReader::new(path.as_ref())
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;
    Ok(df)
}

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Values of a numeric column as f64. Nulls and NaN become `None`.
pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let col = df.column(column)?;
    if !is_numeric_dtype(col.dtype()) {
        return Err(PlotError::NonNumeric {
            column: column.to_string(),
        });
    }
    let as_f64 = col.cast(&DataType::Float64)?;
    let values = as_f64
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Values of any column rendered as category labels.
pub fn category_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let as_str = df.column(column)?.cast(&DataType::String)?;
    let values = as_str
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Distinct labels of a column in plotting order: numeric columns sort by
/// value, everything else keeps first appearance.
pub fn category_levels(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let labels = category_values(df, column)?;
    if !is_numeric_dtype(df.column(column)?.dtype()) {
        return Ok(unique_in_order(labels.into_iter().flatten()));
    }

    let numbers = numeric_values(df, column)?;
    let mut pairs: Vec<(f64, String)> = numbers
        .into_iter()
        .zip(labels)
        .filter_map(|(n, l)| Some((n?, l?)))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.dedup_by(|a, b| a.1 == b.1);
    Ok(pairs.into_iter().map(|(_, label)| label).collect())
}

pub fn unique_in_order<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Plot coordinates of one column.
///
/// Numeric columns map to their values. Any other column maps each label to
/// its index among the category levels, which are kept alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisData {
    pub positions: Vec<Option<f64>>,
    pub categories: Option<Vec<String>>,
}

impl AxisData {
    pub fn from_column(df: &DataFrame, column: &str) -> Result<Self> {
        if is_numeric_dtype(df.column(column)?.dtype()) {
            return Ok(Self {
                positions: numeric_values(df, column)?,
                categories: None,
            });
        }
        let levels = category_levels(df, column)?;
        Self::with_levels(df, column, levels)
    }

    /// Categorical positions against fixed levels; unknown labels map to `None`.
    pub fn with_levels(df: &DataFrame, column: &str, levels: Vec<String>) -> Result<Self> {
        let positions = {
            let index: HashMap<&str, usize> = levels
                .iter()
                .enumerate()
                .map(|(i, level)| (level.as_str(), i))
                .collect();
            category_values(df, column)?
                .into_iter()
                .map(|v| v.and_then(|label| index.get(label.as_str()).map(|&i| i as f64)))
                .collect()
        };
        Ok(Self {
            positions,
            categories: Some(levels),
        })
    }

    pub fn is_categorical(&self) -> bool {
        self.categories.is_some()
    }
}
