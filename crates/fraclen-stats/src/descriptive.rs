/// Descriptive statistics summarizing a dataset.
///
/// This structure contains common measures of central tendency and
/// dispersion for a dataset of `f64` values. Every value is taken at face
/// value: no censoring correction is applied here.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean of the dataset.
    pub mean: f64,
    /// The median value of the dataset (midpoint average for even counts).
    pub median: f64,
    /// The most frequent value; the smallest one wins ties.
    pub mode: f64,
    /// The population variance of the dataset.
    pub variance: f64,
    /// The population standard deviation of the dataset.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use fraclen_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fraclen_stats::descriptive::DescriptiveStats;
    /// let values = [1.0, 2.0, 2.0, 7.0];
    /// let stats = DescriptiveStats::from_sorted(&values).unwrap();
    /// assert_eq!(stats.median, 2.0);
    /// assert_eq!(stats.mode, 2.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = if count % 2 == 1 {
            sorted_values[count / 2]
        } else {
            0.5 * (sorted_values[count / 2 - 1] + sorted_values[count / 2])
        };
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            mode: sorted_mode(sorted_values),
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// Most frequent value of a sorted, non-empty slice.
fn sorted_mode(sorted_values: &[f64]) -> f64 {
    let mut best = sorted_values[0];
    let mut best_run = 0;
    for run in sorted_values.chunk_by(|a, b| a == b) {
        // strict comparison keeps the smallest value on ties
        if run.len() > best_run {
            best = run[0];
            best_run = run.len();
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new([]).is_none());
    }

    #[test]
    fn test_even_count_median_is_midpoint() {
        let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_abs_diff_eq!(stats.median, 2.5);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_population_variance() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_abs_diff_eq!(stats.mean, 5.0);
        assert_abs_diff_eq!(stats.variance, 4.0);
        assert_abs_diff_eq!(stats.std_dev, 2.0);
    }

    #[test]
    fn test_mode_prefers_smallest_on_ties() {
        let stats = DescriptiveStats::new([3.0, 1.0, 3.0, 1.0, 2.0]).unwrap();
        assert_abs_diff_eq!(stats.mode, 1.0);
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([42.0]).unwrap();
        assert_abs_diff_eq!(stats.min, 42.0);
        assert_abs_diff_eq!(stats.max, 42.0);
        assert_abs_diff_eq!(stats.mode, 42.0);
        assert_abs_diff_eq!(stats.std_dev, 0.0);
    }

    #[test]
    #[should_panic(expected = "values must be sorted")]
    fn test_from_sorted_rejects_unsorted() {
        let _ = DescriptiveStats::from_sorted(&[3.0, 1.0]);
    }
}
