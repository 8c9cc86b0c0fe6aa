//! Data module - CSV loading, column extraction and reshaping

pub mod loader;
pub mod processor;

pub use loader::{
    category_levels, category_values, is_numeric_dtype, numeric_values, read_csv,
    unique_in_order, AxisData,
};
pub use processor::{
    count_groups, melt, subset_eq, with_row_index, COUNT_COL, METRIC_COL, VALUE_COL,
};
