//! Statistics Calculator Module
//! Box plot summaries, per-x means and mean/std across repeated runs.

use crate::error::{PlotError, Result};
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Whisker reach in multiples of the interquartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Calculate percentile using linear interpolation (NumPy compatible).
///
/// `sorted_values` must be sorted ascending.
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

/// Summary drawn by one box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest data point within `q1 - 1.5 * IQR`.
    pub whisker_low: f64,
    /// Highest data point within `q3 + 1.5 * IQR`.
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

impl BoxStats {
    /// `None` when there is no finite value.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let lo_fence = q1 - WHISKER_IQR * iqr;
        let hi_fence = q3 + WHISKER_IQR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|v| *v >= lo_fence)
            .unwrap_or(q1)
            .min(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= hi_fence)
            .unwrap_or(q3)
            .max(q3);
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < whisker_low || *v > whisker_high)
            .collect();

        Some(Self {
            count: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            fliers,
        })
    }

    /// Lowest and highest value drawn, fliers included when requested.
    pub fn extent(&self, with_fliers: bool) -> (f64, f64) {
        let mut lo = self.whisker_low;
        let mut hi = self.whisker_high;
        if with_fliers {
            for v in &self.fliers {
                lo = lo.min(*v);
                hi = hi.max(*v);
            }
        }
        (lo, hi)
    }
}

/// Box statistics for many groups at once, computed in parallel.
pub fn box_stats_parallel(groups: &[Vec<f64>]) -> Vec<Option<BoxStats>> {
    groups
        .par_iter()
        .map(|values| BoxStats::from_values(values))
        .collect()
}

/// Average y over duplicate x values; output sorted by x.
pub fn mean_by_x(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    let mut i = 0;
    while i < sorted.len() {
        let x = sorted[i].0;
        let mut j = i;
        let mut sum = 0.0;
        while j < sorted.len() && sorted[j].0 == x {
            sum += sorted[j].1;
            j += 1;
        }
        out.push((x, sum / (j - i) as f64));
        i = j;
    }
    out
}

/// Per-step mean and population standard deviation across repeated runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanStd {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl MeanStd {
    /// All runs must have the same length.
    pub fn from_runs(runs: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = runs.first() else {
            return Err(PlotError::EmptyData("no runs given".into()));
        };
        let steps = first.len();
        if let Some(bad) = runs.iter().position(|r| r.len() != steps) {
            return Err(PlotError::InvalidArgument(format!(
                "run {} has {} steps, expected {}",
                bad,
                runs[bad].len(),
                steps
            )));
        }

        let (mean, std) = (0..steps)
            .map(|step| {
                let column: Vec<f64> = runs.iter().map(|r| r[step]).collect();
                (column.iter().mean(), column.iter().population_std_dev())
            })
            .unzip();
        Ok(Self { mean, std })
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn percentile_matches_numpy_linear() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(percentile(&v, 25.0), 1.75));
        assert!(approx(percentile(&v, 50.0), 2.5));
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn outliers_fall_outside_whiskers() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(stats.count, 6);
        assert!(approx(stats.median, 3.5));
        assert_eq!(stats.whisker_high, 5.0);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.fliers, vec![100.0]);
        assert_eq!(stats.extent(true), (1.0, 100.0));
        assert_eq!(stats.extent(false), (1.0, 5.0));
    }

    #[test]
    fn empty_groups_have_no_box() {
        let all = box_stats_parallel(&[vec![], vec![f64::NAN], vec![2.0]]);
        assert!(all[0].is_none() && all[1].is_none());
        assert_eq!(all[2].as_ref().map(|s| s.median), Some(2.0));
    }

    #[test]
    fn duplicate_x_values_are_averaged() {
        let pts = [(2.0, 4.0), (1.0, 1.0), (2.0, 6.0)];
        assert_eq!(mean_by_x(&pts), vec![(1.0, 1.0), (2.0, 5.0)]);
    }

    #[test]
    fn mean_std_across_runs() {
        let ms = MeanStd::from_runs(&[vec![1.0, 2.0], vec![3.0, 2.0]]).unwrap();
        assert_eq!(ms.mean, vec![2.0, 2.0]);
        assert!(approx(ms.std[0], 1.0) && approx(ms.std[1], 0.0));
        assert!(MeanStd::from_runs(&[vec![1.0], vec![1.0, 2.0]]).is_err());
        assert!(MeanStd::from_runs(&[]).is_err());
    }
}
