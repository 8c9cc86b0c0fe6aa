//! Statistics module - box plot summaries and per-step curve aggregates

mod calculator;

pub use calculator::{box_stats_parallel, mean_by_x, percentile, BoxStats, MeanStd};
