//! Information criteria and EDF goodness-of-fit distances.
//!
//! The three distances compare the fitted CDF `Z[j] = F(x_(j))` against the
//! Kaplan-Meier CDF `G[j]` at the sorted sample lengths `x_(j)`. In every
//! formula `Z[n]` (one past the last index) is taken as `1`.
//!
//! All slice arguments must be sorted by length and mutually aligned; this is
//! not re-checked.

use crate::distribution::FittedDistribution;

/// Value reported for an information criterion that is undefined for the
/// sample size (AICc with `n <= k + 1`).
pub const INVALID_CRITERION: f64 = -1.0;

/// Distance from 0 and 1 applied to CDF values before taking logarithms.
pub const BOUNDARY_EPSILON: f64 = 1e-10;

/// Criterion used to compare fitted families.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::FromStr,
)]
pub enum InformationCriterion {
    #[display("AIC")]
    Aic,
    #[default]
    #[display("AICc")]
    Aicc,
    #[display("BIC")]
    Bic,
}

/// Every metric of one fitted distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoodnessOfFit {
    pub aic: f64,
    /// [`INVALID_CRITERION`] when the sample is too small.
    pub aicc: f64,
    pub bic: f64,
    pub ks_distance: f64,
    pub kg_distance: f64,
    pub ad_distance: f64,
    /// Number of observations.
    pub n: usize,
    /// Number of free parameters.
    pub k: usize,
}

impl GoodnessOfFit {
    #[must_use]
    pub fn compute(fitted: &FittedDistribution) -> Self {
        let sample = fitted.sample();
        let n = sample.len();
        let k = fitted.n_parameters();
        let log_likelihood = fitted.max_log_likelihood();

        let z = sample
            .lengths()
            .iter()
            .map(|&x| fitted.cdf(x))
            .collect::<Vec<_>>();
        let g = sample.empirical_cdf().probabilities();

        Self {
            aic: aic(log_likelihood, k),
            aicc: aicc(log_likelihood, k, n),
            bic: bic(log_likelihood, k, n),
            ks_distance: ks_distance(&z, g, sample.is_censored()),
            kg_distance: kg_distance(&z, g),
            ad_distance: ad_distance(&z, g),
            n,
            k,
        }
    }

    /// Value of the requested criterion.
    #[must_use]
    pub fn criterion(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Aicc => self.aicc,
            InformationCriterion::Bic => self.bic,
        }
    }

    /// `false` if the requested criterion is undefined for this sample.
    #[must_use]
    pub fn is_criterion_valid(&self, criterion: InformationCriterion) -> bool {
        match criterion {
            InformationCriterion::Aicc => aicc_is_defined(self.k, self.n),
            InformationCriterion::Aic | InformationCriterion::Bic => true,
        }
    }
}

/// Whether AICc is defined for `k` free parameters and `n` observations.
#[must_use]
pub fn aicc_is_defined(k: usize, n: usize) -> bool {
    n > k + 1
}

#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn aic(log_likelihood: f64, k: usize) -> f64 {
    -2.0 * log_likelihood + 2.0 * k as f64
}

/// Small-sample corrected AIC, or [`INVALID_CRITERION`] if `n <= k + 1`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn aicc(log_likelihood: f64, k: usize, n: usize) -> f64 {
    if !aicc_is_defined(k, n) {
        return INVALID_CRITERION;
    }
    let kf = k as f64;
    aic(log_likelihood, k) + (2.0 * kf * kf + 2.0 * kf) / (n - k - 1) as f64
}

#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn bic(log_likelihood: f64, k: usize, n: usize) -> f64 {
    (n as f64).ln() * k as f64 - 2.0 * log_likelihood
}

fn next_z(z: &[f64], j: usize) -> f64 {
    z.get(j + 1).copied().unwrap_or(1.0)
}

/// Kolmogorov-Smirnov distance for right-censored data.
///
/// Only complete observations contribute:
/// `max_j max(G[j] - Z[j], Z[j+1] - G[j])`.
#[must_use]
pub fn ks_distance(z: &[f64], g: &[f64], censored: &[bool]) -> f64 {
    (0..z.len())
        .filter(|&j| !censored[j])
        .flat_map(|j| [g[j] - z[j], next_z(z, j) - g[j]])
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Koziol-Green `psi^2` statistic.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn kg_distance(z: &[f64], g: &[f64]) -> f64 {
    let n = z.len() as f64;
    let sum = (0..z.len())
        .map(|j| {
            let (lo, hi) = (z[j], next_z(z, j));
            g[j] * (hi - lo) * (g[j] - (hi + lo))
        })
        .sum::<f64>();
    n * sum + n / 3.0
}

fn nudge(z: f64) -> f64 {
    if z <= 0.0 {
        BOUNDARY_EPSILON
    } else if z >= 1.0 {
        1.0 - BOUNDARY_EPSILON
    } else {
        z
    }
}

/// Anderson-Darling `A^2` statistic for right-censored data.
///
/// CDF values of exactly 0 or 1 are moved [`BOUNDARY_EPSILON`] into the open
/// interval so that every logarithm is finite.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn ad_distance(z: &[f64], g: &[f64]) -> f64 {
    let Some(&last) = z.last() else {
        return 0.0;
    };
    let n = z.len() as f64;
    let ln_z = z.iter().map(|&v| nudge(v).ln()).collect::<Vec<_>>();
    let ln_1mz = z.iter().map(|&v| (1.0 - nudge(v)).ln()).collect::<Vec<_>>();

    let (mut sum1, mut sum2) = (0.0, 0.0);
    for j in 0..z.len() - 1 {
        sum1 += g[j] * g[j] * (-ln_1mz[j + 1] + ln_z[j + 1] + ln_1mz[j] - ln_z[j]);
        sum2 += g[j] * (-ln_1mz[j + 1] + ln_1mz[j]);
    }

    let last = nudge(last);
    n * sum1 - 2.0 * n * sum2 - n * (1.0 - last).ln() - n * last.ln() - n
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{family::find_family, sample::CensoredSample};

    #[test]
    fn test_information_criteria() {
        assert_abs_diff_eq!(aic(-10.0, 2), 24.0);
        assert_abs_diff_eq!(aicc(-10.0, 2, 10), 24.0 + 12.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bic(-10.0, 2, 10), 10f64.ln() * 2.0 + 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_aicc_sentinel() {
        assert_eq!(aicc(-3.0, 2, 3), INVALID_CRITERION);
        assert_eq!(aicc(-3.0, 3, 3), INVALID_CRITERION);
        assert!(aicc(-3.0, 1, 3) > 0.0);
    }

    #[test]
    fn test_criterion_parsing() {
        assert_eq!("aicc".parse::<InformationCriterion>().unwrap(), InformationCriterion::Aicc);
        assert_eq!("AIC".parse::<InformationCriterion>().unwrap(), InformationCriterion::Aic);
        assert_eq!("bic".parse::<InformationCriterion>().unwrap(), InformationCriterion::Bic);
        assert!("hqic".parse::<InformationCriterion>().is_err());
        assert_eq!(InformationCriterion::Aicc.to_string(), "AICc");
    }

    #[test]
    fn test_ks_perfect_step() {
        // model CDF equal to the empirical CDF just before each jump
        let g = [0.25, 0.5, 0.75, 1.0];
        let z = [0.0, 0.25, 0.5, 0.75];
        let d = ks_distance(&z, &g, &[false; 4]);
        assert_abs_diff_eq!(d, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_ks_skips_censored() {
        let g = [0.5, 0.5, 1.0];
        let z = [0.1, 0.9, 0.95];
        let all = ks_distance(&z, &g, &[false; 3]);
        let skipped = ks_distance(&z, &g, &[false, true, false]);
        // index 1 contributes Z[2] - G[1] = 0.45 only when it is complete
        assert_abs_diff_eq!(all, 0.45, epsilon = 1e-12);
        assert_abs_diff_eq!(skipped, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_kg_hand_computed() {
        let z = [0.2, 0.6];
        let g = [0.5, 1.0];
        // j=0: 0.5 * 0.4 * (0.5 - 0.8) = -0.06
        // j=1: 1.0 * 0.4 * (1.0 - 1.6) = -0.24
        let expected = 2.0 * (-0.06 - 0.24) + 2.0 / 3.0;
        assert_abs_diff_eq!(kg_distance(&z, &g), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_ad_boundary_values_are_finite() {
        let z = [0.0, 0.5, 1.0];
        let g = [1.0 / 3.0, 2.0 / 3.0, 1.0];
        assert!(ad_distance(&z, &g).is_finite());
    }

    #[test]
    fn test_ad_hand_computed() {
        let z: [f64; 2] = [0.25, 0.75];
        let g = [0.5, 1.0];
        let sum1 = 0.25 * (-(0.25f64).ln() + 0.75f64.ln() + 0.75f64.ln() - 0.25f64.ln());
        let sum2 = 0.5 * (-(0.25f64).ln() + 0.75f64.ln());
        let expected = 2.0 * sum1 - 4.0 * sum2 - 2.0 * 0.25f64.ln() - 2.0 * 0.75f64.ln() - 2.0;
        assert_abs_diff_eq!(ad_distance(&z, &g), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_compute_on_fitted_distribution() {
        let sample = CensoredSample::new(
            &[1.0, 1.5, 2.0, 2.6, 3.1, 4.0, 5.5, 7.0],
            &[false, false, false, false, true, false, false, true],
        )
        .unwrap();
        let fitted =
            FittedDistribution::fit(find_family("lognorm").unwrap(), Arc::new(sample)).unwrap();
        let gof = GoodnessOfFit::compute(&fitted);
        for value in [
            gof.aic,
            gof.aicc,
            gof.bic,
            gof.ks_distance,
            gof.kg_distance,
            gof.ad_distance,
        ] {
            assert!(value.is_finite());
        }
        assert!(gof.aicc > gof.aic);
        assert!(gof.is_criterion_valid(InformationCriterion::Aicc));
        assert_abs_diff_eq!(gof.criterion(InformationCriterion::Bic), gof.bic);
    }
}
