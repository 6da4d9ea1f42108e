//! Kaplan-Meier product-limit estimation for right-censored data.
//!
//! The estimator turns a set of observations, some of which are only known
//! to be *at least* as large as the recorded value, into an empirical
//! cumulative distribution function:
//!
//! ```text
//! F(z) = 1 - Π_{j : x_(j) <= z} ((n - j) / (n - j + 1))^δ_j
//! ```
//!
//! where `x_(j)` is the `j`-th smallest observation (1-based), `n` the
//! sample size and `δ_j` is 1 for complete observations and 0 for censored
//! ones. Censored observations therefore never move the curve; they only
//! shrink the risk set of the observations after them.
//!
//! # Tie policy
//!
//! Observations are ordered by value, and at equal values complete
//! observations come before censored ones. The order is fixed by
//! [`sort_observations`] and does not depend on the input order.

use std::cmp::Ordering;

/// A right-continuous, non-decreasing step curve evaluated at a set of points.
///
/// Produced by [`kaplan_meier`]. Values are probabilities in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalCurve {
    points: Vec<f64>,
    probabilities: Vec<f64>,
}

impl EmpiricalCurve {
    /// Evaluation points, in the order they were supplied.
    #[must_use]
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Curve values, parallel to [`Self::points`].
    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over `(point, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
    }

    /// Survival curve (`1 - p` at every point).
    ///
    /// Turns an empirical CDF into the matching survival function.
    #[must_use]
    pub fn survival(&self) -> Self {
        Self {
            points: self.points.clone(),
            probabilities: self.probabilities.iter().map(|p| 1.0 - p).collect(),
        }
    }

    /// Value of the step curve at `z`.
    ///
    /// Returns the probability of the largest evaluation point `<= z`, or `0.0`
    /// if `z` lies below every point. Assumes the points are sorted ascending.
    #[must_use]
    pub fn value_at(&self, z: f64) -> f64 {
        let idx = self.points.partition_point(|&p| p <= z);
        if idx == 0 {
            0.0
        } else {
            self.probabilities[idx - 1]
        }
    }

    /// Point at which the curve first reaches 0.5.
    ///
    /// Linear interpolation is used between the two surrounding points.
    /// Returns `None` if the curve never reaches 0.5 (heavy censoring) or is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fraclen_stats::survival::kaplan_meier;
    /// let data = [1.0, 2.0, 3.0, 4.0];
    /// let curve = kaplan_meier(&data, &data, &[false; 4]);
    /// let median = curve.median().unwrap();
    /// assert!((median - 2.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn median(&self) -> Option<f64> {
        let i = self.probabilities.iter().position(|&p| p >= 0.5)?;
        if i == 0 {
            return Some(self.points[0]);
        }
        let (x0, x1) = (self.points[i - 1], self.points[i]);
        let (p0, p1) = (self.probabilities[i - 1], self.probabilities[i]);
        if (p1 - p0).abs() < f64::EPSILON {
            return Some(x1);
        }
        Some(x0 + (0.5 - p0) / (p1 - p0) * (x1 - x0))
    }
}

/// Orders `(value, is_censored)` pairs for product-limit estimation.
///
/// Ascending by value; complete observations precede censored observations
/// with the same value.
pub fn sort_observations(observations: &mut [(f64, bool)]) {
    observations.sort_by(compare_observations);
}

fn compare_observations(a: &(f64, bool), b: &(f64, bool)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

/// Computes the Kaplan-Meier empirical CDF at every evaluation point.
///
/// # Arguments
///
/// * `evaluation_points` - Points at which the curve is evaluated (any order)
/// * `data` - Observed values
/// * `censored` - `true` where the matching value is right-censored
///
/// # Returns
///
/// For each evaluation point `z`: `0.0` below the smallest datum, `1.0` above
/// the largest datum and the product-limit estimate otherwise.
///
/// # Panics
///
/// Panics if `data` is empty or if `data` and `censored` differ in length.
///
/// # Examples
///
/// ```
/// # use fraclen_stats::survival::kaplan_meier;
/// // the last observation is censored, so the curve stays below 1 at 10.0
/// let data = [1.0, 2.0, 3.0, 10.0];
/// let censored = [false, false, false, true];
/// let curve = kaplan_meier(&[10.0], &data, &censored);
/// assert!((curve.probabilities()[0] - 0.75).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn kaplan_meier(evaluation_points: &[f64], data: &[f64], censored: &[bool]) -> EmpiricalCurve {
    assert_eq!(
        data.len(),
        censored.len(),
        "data and censoring flags must have the same length"
    );
    assert!(!data.is_empty(), "data must not be empty");

    let mut observations = data
        .iter()
        .copied()
        .zip(censored.iter().copied())
        .collect::<Vec<_>>();
    sort_observations(&mut observations);

    let n = observations.len();
    let first = observations[0].0;
    let last = observations[n - 1].0;

    // survival[j] = product of the factors of observations 0..=j
    let mut survival = Vec::with_capacity(n);
    let mut product = 1.0;
    for (j, &(_, is_censored)) in observations.iter().enumerate() {
        if !is_censored {
            let remaining = (n - (j + 1)) as f64;
            product *= remaining / (remaining + 1.0);
        }
        survival.push(product);
    }

    let probabilities = evaluation_points
        .iter()
        .map(|&z| {
            if z < first {
                0.0
            } else if z > last {
                1.0
            } else {
                let included = observations.partition_point(|&(x, _)| x <= z);
                1.0 - survival[included - 1]
            }
        })
        .collect();

    EmpiricalCurve {
        points: evaluation_points.to_vec(),
        probabilities,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_no_censoring_reduces_to_ecdf() {
        let data = (1..=10).map(f64::from).collect::<Vec<_>>();
        let curve = kaplan_meier(&data, &data, &[false; 10]);
        for (x, p) in curve.iter() {
            assert_abs_diff_eq!(p, x / 10.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(curve.value_at(5.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_censored_last_observation_stays_below_one() {
        let data = [1.0, 2.0, 3.0, 10.0];
        let censored = [false, false, false, true];
        let curve = kaplan_meier(&[3.0, 10.0, 10.5], &data, &censored);
        assert_abs_diff_eq!(curve.probabilities()[0], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.probabilities()[1], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.probabilities()[2], 1.0);
    }

    #[test]
    fn test_censored_observation_shrinks_risk_set() {
        // 1 complete, 2 censored, 3 complete, 4 complete
        let data = [1.0, 2.0, 3.0, 4.0];
        let censored = [false, true, false, false];
        let curve = kaplan_meier(&data, &data, &censored);
        let expected = [0.25, 0.25, 1.0 - 0.75 * 0.5, 1.0];
        for (p, e) in curve.probabilities().iter().zip(expected) {
            assert_abs_diff_eq!(*p, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let data = [4.0, 1.0, 3.0, 2.0];
        let censored = [false, false, false, true];
        let sorted_data = [1.0, 2.0, 3.0, 4.0];
        let sorted_censored = [false, true, false, false];
        let points = [0.5, 1.0, 2.5, 3.0, 4.0];
        assert_eq!(
            kaplan_meier(&points, &data, &censored),
            kaplan_meier(&points, &sorted_data, &sorted_censored)
        );
    }

    #[test]
    fn test_tie_policy_complete_before_censored() {
        let mut observations = vec![(2.0, true), (1.0, false), (2.0, false), (1.0, true)];
        sort_observations(&mut observations);
        assert_eq!(
            observations,
            vec![(1.0, false), (1.0, true), (2.0, false), (2.0, true)]
        );
    }

    #[test]
    fn test_survival_and_median() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let curve = kaplan_meier(&data, &data, &[false; 6]);
        assert_abs_diff_eq!(curve.median().unwrap(), 3.0, epsilon = 1e-9);
        let sf = curve.survival();
        assert_abs_diff_eq!(sf.value_at(3.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_median_unreached_under_heavy_censoring() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let censored = [false, true, true, true];
        let curve = kaplan_meier(&data, &data, &censored);
        assert_eq!(curve.median(), None);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mismatched_lengths_panic() {
        let _ = kaplan_meier(&[1.0], &[1.0, 2.0], &[false]);
    }

    fn observations() -> impl Strategy<Value = Vec<(f64, bool)>> {
        prop::collection::vec((0.01f64..1000.0, any::<bool>()), 1..60)
    }

    proptest! {
        #[test]
        fn curve_is_monotone_and_bounded(
            obs in observations(),
            mut points in prop::collection::vec(0.0f64..1100.0, 1..80),
        ) {
            let (data, censored): (Vec<f64>, Vec<bool>) = obs.into_iter().unzip();
            points.sort_by(f64::total_cmp);
            let curve = kaplan_meier(&points, &data, &censored);
            for w in curve.probabilities().windows(2) {
                prop_assert!(w[0] <= w[1]);
            }
            for &p in curve.probabilities() {
                prop_assert!((0.0..=1.0).contains(&p));
            }
        }

        #[test]
        fn curve_boundary_values(obs in observations()) {
            let (data, censored): (Vec<f64>, Vec<bool>) = obs.into_iter().unzip();
            let min = data.iter().copied().fold(f64::INFINITY, f64::min);
            let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let curve = kaplan_meier(&[min / 2.0, max + 1.0], &data, &censored);
            prop_assert_eq!(curve.probabilities(), &[0.0, 1.0]);
        }
    }
}
