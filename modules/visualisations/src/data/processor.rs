//! Reshaping helpers: wide to long, row index, subsets and group counts.

use crate::data::loader::numeric_values;
use crate::error::{PlotError, Result};
use polars::prelude::*;

pub const METRIC_COL: &str = "Metric";
pub const VALUE_COL: &str = "Value";
pub const COUNT_COL: &str = "Count";

/// Stack `value_vars` into long format.
///
/// Output columns: `id_vars...`, `"Metric"`, `"Value"`. Id columns are
/// repeated once per value column, so row `k * height + i` is row `i` of
/// value column `k`.
pub fn melt(df: &DataFrame, id_vars: &[&str], value_vars: &[String]) -> Result<DataFrame> {
    if value_vars.is_empty() {
        return Err(PlotError::InvalidArgument(
            "at least one value column is required".into(),
        ));
    }

    let mut columns: Vec<Column> = Vec::with_capacity(id_vars.len() + 2);
    for id in id_vars {
        let base = df.column(id)?.as_materialized_series().clone();
        let mut stacked = base.clone();
        for _ in 1..value_vars.len() {
            stacked.append(&base)?;
        }
        columns.push(Column::from(stacked));
    }

    let mut metrics: Vec<String> = Vec::with_capacity(df.height() * value_vars.len());
    let mut values: Vec<Option<f64>> = Vec::with_capacity(df.height() * value_vars.len());
    for var in value_vars {
        let column = numeric_values(df, var)?;
        metrics.extend(std::iter::repeat(var.clone()).take(column.len()));
        values.extend(column);
    }

    columns.push(Column::new(METRIC_COL.into(), metrics));
    columns.push(Column::new(VALUE_COL.into(), values));
    Ok(DataFrame::new(columns)?)
}

/// Prepend a `u32` row index column.
pub fn with_row_index(df: &DataFrame, name: &str) -> Result<DataFrame> {
    Ok(df.with_row_index(name.into(), None)?)
}

/// Rows where `column` equals `value`.
pub fn subset_eq(df: &DataFrame, column: &str, value: &str) -> Result<DataFrame> {
    let filtered = df
        .clone()
        .lazy()
        .filter(col(column).eq(lit(value)))
        .collect()?;
    Ok(filtered)
}

/// Number of rows per combination of `groupby` values, in a `"Count"` column.
///
/// Rows with a null key are dropped. Groups come out sorted by their keys,
/// then stably re-sorted by `sort_col` when given.
pub fn count_groups(df: &DataFrame, groupby: &[String], sort_col: Option<&str>) -> Result<DataFrame> {
    if groupby.is_empty() {
        return Err(PlotError::InvalidArgument(
            "groupby needs at least one column".into(),
        ));
    }

    let keys: Vec<Expr> = groupby.iter().map(|g| col(g.as_str())).collect();
    let not_null = keys
        .iter()
        .fold(lit(true), |acc, key| acc.and(key.clone().is_not_null()));

    let mut counted = df
        .clone()
        .lazy()
        .filter(not_null)
        .group_by(keys.clone())
        .agg([len().alias(COUNT_COL)])
        .sort_by_exprs(keys, SortMultipleOptions::default());

    if let Some(sort_col) = sort_col {
        counted = counted.sort_by_exprs(
            [col(sort_col)],
            SortMultipleOptions::default().with_maintain_order(true),
        );
    }

    Ok(counted.collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::category_values;

    #[test]
    fn melt_stacks_value_columns() {
        let df = df!(
            "epoch" => [0i64, 1],
            "train_loss" => [1.0f64, 0.5],
            "val_loss" => [1.2f64, 0.7]
        )
        .unwrap();
        let long = melt(&df, &["epoch"], &["train_loss".into(), "val_loss".into()]).unwrap();

        assert_eq!(long.height(), 4);
        assert_eq!(
            category_values(&long, METRIC_COL).unwrap(),
            vec![
                Some("train_loss".to_string()),
                Some("train_loss".to_string()),
                Some("val_loss".to_string()),
                Some("val_loss".to_string())
            ]
        );
        assert_eq!(
            numeric_values(&long, VALUE_COL).unwrap(),
            vec![Some(1.0), Some(0.5), Some(1.2), Some(0.7)]
        );
        assert_eq!(
            numeric_values(&long, "epoch").unwrap(),
            vec![Some(0.0), Some(1.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn melt_rejects_text_value_columns() {
        let df = df!("a" => ["x"], "b" => ["y"]).unwrap();
        assert!(melt(&df, &["a"], &["b".into()]).is_err());
        assert!(melt(&df, &["a"], &[]).is_err());
    }

    #[test]
    fn subset_keeps_matching_rows() {
        let df = df!("m" => ["a", "b", "a"], "v" => [1i32, 2, 3]).unwrap();
        let sub = subset_eq(&df, "m", "a").unwrap();
        assert_eq!(sub.height(), 2);
    }

    #[test]
    fn counts_per_group_sorted_by_key() {
        let df = df!(
            "model" => ["b", "a", "b", "b", "a"],
            "size" => [1i64, 1, 1, 2, 1]
        )
        .unwrap();
        let counts = count_groups(&df, &["model".into(), "size".into()], None).unwrap();

        assert_eq!(
            category_values(&counts, "model").unwrap(),
            vec![Some("a".to_string()), Some("b".to_string()), Some("b".to_string())]
        );
        assert_eq!(
            numeric_values(&counts, COUNT_COL).unwrap(),
            vec![Some(2.0), Some(2.0), Some(1.0)]
        );

        let by_count = count_groups(&df, &["model".into(), "size".into()], Some(COUNT_COL)).unwrap();
        assert_eq!(
            numeric_values(&by_count, COUNT_COL).unwrap(),
            vec![Some(1.0), Some(2.0), Some(2.0)]
        );
    }
}
