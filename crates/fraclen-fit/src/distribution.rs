//! A parametric family fitted to a censored sample by maximum likelihood.
//!
//! # Likelihood
//!
//! For right-censored data the log-likelihood is
//!
//! ```text
//! ln L = Σ_complete ln f(x_i) + Σ_censored ln S(x_i)
//! ```
//!
//! where `f` is the density and `S = 1 - F` the survival function: a censored
//! length only tells us that the true length is larger than recorded.
//!
//! The search runs over the family's unconstrained coordinates (see
//! [`DistributionFamily::parameters_from`]) with the Nelder-Mead simplex
//! method. The location parameter stays at `0.0` for every family whose
//! location is not free.

use std::sync::Arc;

use fraclen_stats::optimize::{NelderMeadOptions, OptimizeError, nelder_mead};

use crate::{
    family::{
        BoxedDistributionFamily, BoxedLengthDistribution, DistributionFamily, LengthDistribution,
        ParameterError,
    },
    sample::CensoredSample,
};

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("unknown distribution family '{name}'")]
    UnknownFamily { name: String },
    #[display("fitting '{family}' did not converge: {source}")]
    Convergence {
        family: &'static str,
        source: OptimizeError,
    },
    #[display("log-likelihood of '{family}' is not finite at the optimum")]
    NonFiniteLikelihood { family: &'static str },
    #[display("{_0}")]
    InvalidParameters(ParameterError),
}

impl FitError {
    /// Identifier of the family the error refers to.
    #[must_use]
    pub fn family(&self) -> &str {
        match self {
            Self::UnknownFamily { name } => name.as_str(),
            Self::Convergence { family, .. } | Self::NonFiniteLikelihood { family } => *family,
            Self::InvalidParameters(err) => err.family,
        }
    }
}

/// One family fitted to one sample. Immutable.
#[derive(Debug, Clone)]
pub struct FittedDistribution {
    family: BoxedDistributionFamily,
    parameters: Vec<f64>,
    model: BoxedLengthDistribution,
    sample: Arc<CensoredSample>,
    log_likelihood: f64,
}

impl FittedDistribution {
    /// Fits `family` to `sample` with the default optimizer settings.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::Convergence`] if the optimizer fails and
    /// [`FitError::NonFiniteLikelihood`] if the optimum is degenerate.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use fraclen_fit::{distribution::FittedDistribution, family::find_family, sample::CensoredSample};
    ///
    /// let sample = CensoredSample::new(&[1.0, 2.0, 4.0, 8.0], &[false, false, false, true]).unwrap();
    /// let fitted = FittedDistribution::fit(find_family("expon").unwrap(), Arc::new(sample)).unwrap();
    /// // 15 units observed in total, 3 complete
    /// assert!((fitted.parameters()[1] - 5.0).abs() < 1e-12);
    /// ```
    pub fn fit(
        family: &dyn DistributionFamily,
        sample: Arc<CensoredSample>,
    ) -> Result<Self, FitError> {
        Self::fit_with_options(family, sample, &NelderMeadOptions::default())
    }

    /// Fits `family` to `sample` with explicit optimizer settings.
    ///
    /// # Errors
    ///
    /// See [`Self::fit`].
    pub fn fit_with_options(
        family: &dyn DistributionFamily,
        sample: Arc<CensoredSample>,
        options: &NelderMeadOptions,
    ) -> Result<Self, FitError> {
        let parameters = match family.closed_form_fit(&sample) {
            Some(parameters) => parameters,
            None => {
                let objective = |theta: &[f64]| {
                    let parameters = family.parameters_from(theta, &sample);
                    match family.instantiate(&parameters) {
                        Ok(model) => -log_likelihood(model.as_ref(), &sample),
                        Err(_) => f64::INFINITY,
                    }
                };
                let start = family.initial_guess(&sample);
                let minimum = nelder_mead(objective, &start, options).map_err(|source| {
                    FitError::Convergence {
                        family: family.id(),
                        source,
                    }
                })?;
                log::debug!(
                    "{}: converged after {} iterations (-lnL = {})",
                    family.id(),
                    minimum.iterations,
                    minimum.value
                );
                family.parameters_from(&minimum.point, &sample)
            }
        };

        let model = family
            .instantiate(&parameters)
            .map_err(FitError::InvalidParameters)?;
        let log_likelihood = log_likelihood(model.as_ref(), &sample);
        if !log_likelihood.is_finite() {
            return Err(FitError::NonFiniteLikelihood {
                family: family.id(),
            });
        }

        Ok(Self {
            family: family.clone_boxed(),
            parameters,
            model,
            sample,
            log_likelihood,
        })
    }

    /// Identifier of the fitted family, e.g. `"lognorm"`.
    #[must_use]
    pub fn distribution_name(&self) -> &'static str {
        self.family.id()
    }

    #[must_use]
    pub fn family(&self) -> &dyn DistributionFamily {
        self.family.as_ref()
    }

    /// Full parameter tuple `(shapes..., loc, scale)`.
    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    #[must_use]
    pub fn location(&self) -> f64 {
        self.parameters[self.parameters.len() - 2]
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.parameters[self.parameters.len() - 1]
    }

    #[must_use]
    pub fn sample(&self) -> &Arc<CensoredSample> {
        &self.sample
    }

    #[must_use]
    pub fn model(&self) -> &dyn LengthDistribution {
        self.model.as_ref()
    }

    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        self.model.pdf(x)
    }

    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        self.model.cdf(x)
    }

    #[must_use]
    pub fn sf(&self, x: f64) -> f64 {
        self.model.sf(x)
    }

    /// Log-density at every point of `xs`; `[0.0]` when `xs` is empty.
    #[must_use]
    pub fn log_pdf(&self, xs: &[f64]) -> Vec<f64> {
        if xs.is_empty() {
            return vec![0.0];
        }
        xs.iter().map(|&x| self.model.ln_pdf(x)).collect()
    }

    /// Log-survival at every point of `xs`; `[0.0]` when `xs` is empty.
    #[must_use]
    pub fn log_sf(&self, xs: &[f64]) -> Vec<f64> {
        if xs.is_empty() {
            return vec![0.0];
        }
        xs.iter().map(|&x| self.model.ln_sf(x)).collect()
    }

    /// Right-censored log-likelihood of the sample at the fitted parameters.
    #[must_use]
    pub fn max_log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Number of estimated parameters (the fixed location is not counted).
    #[must_use]
    pub fn n_parameters(&self) -> usize {
        self.family.free_parameter_count()
    }

    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        self.model.mean()
    }

    #[must_use]
    pub fn var(&self) -> Option<f64> {
        self.model.variance()
    }

    #[must_use]
    pub fn std(&self) -> Option<f64> {
        self.var().map(f64::sqrt)
    }

    #[must_use]
    pub fn quantile(&self, p: f64) -> f64 {
        self.model.quantile(p)
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// 5th percentile.
    #[must_use]
    pub fn b5(&self) -> f64 {
        self.quantile(0.05)
    }

    /// 95th percentile.
    #[must_use]
    pub fn b95(&self) -> f64 {
        self.quantile(0.95)
    }

    /// Local maximum of the density.
    ///
    /// The search starts at the last parameter (the scale) rounded up, so for
    /// multimodal densities the result is not necessarily the global mode.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError`] if the search does not converge.
    pub fn mode(&self) -> Result<f64, OptimizeError> {
        let start = self.scale().ceil();
        let minimum = nelder_mead(
            |x| -self.model.pdf(x[0]),
            &[start],
            &NelderMeadOptions::default(),
        )?;
        Ok(minimum.point[0])
    }
}

fn log_likelihood(model: &dyn LengthDistribution, sample: &CensoredSample) -> f64 {
    let complete = sample
        .complete_lengths()
        .iter()
        .map(|&x| model.ln_pdf(x))
        .sum::<f64>();
    let censored = sample
        .censored_lengths()
        .iter()
        .map(|&x| model.ln_sf(x))
        .sum::<f64>();
    complete + censored
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::family::find_family;

    fn fit(name: &str, lengths: &[f64], censored: &[bool]) -> FittedDistribution {
        let sample = Arc::new(CensoredSample::new(lengths, censored).unwrap());
        FittedDistribution::fit(find_family(name).unwrap(), sample).unwrap()
    }

    const LENGTHS: [f64; 12] = [
        0.6, 0.9, 1.2, 1.4, 1.7, 2.1, 2.4, 3.0, 3.3, 4.1, 5.6, 7.9,
    ];

    #[test]
    fn test_normal_uncensored_matches_moments() {
        let fitted = fit("norm", &LENGTHS, &[false; 12]);
        let mean = LENGTHS.iter().sum::<f64>() / 12.0;
        let var = LENGTHS.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 12.0;
        assert_abs_diff_eq!(fitted.location(), mean, epsilon = 1e-4);
        assert_abs_diff_eq!(fitted.scale(), var.sqrt(), epsilon = 1e-4);
        assert_eq!(fitted.n_parameters(), 2);
    }

    #[test]
    fn test_lognormal_uncensored_matches_log_moments() {
        let fitted = fit("lognorm", &LENGTHS, &[false; 12]);
        let logs = LENGTHS.iter().map(|x| x.ln()).collect::<Vec<_>>();
        let mu = logs.iter().sum::<f64>() / 12.0;
        let s = (logs.iter().map(|l| (l - mu).powi(2)).sum::<f64>() / 12.0).sqrt();
        assert_abs_diff_eq!(fitted.parameters()[0], s, epsilon = 1e-4);
        assert_abs_diff_eq!(fitted.scale(), mu.exp(), epsilon = 1e-3);
        assert_eq!(fitted.location(), 0.0);
    }

    #[test]
    fn test_censoring_raises_exponential_scale() {
        let complete = fit("expon", &LENGTHS, &[false; 12]);
        let mut flags = [false; 12];
        flags[11] = true;
        flags[10] = true;
        let censored = fit("expon", &LENGTHS, &flags);
        assert!(censored.scale() > complete.scale());
        assert_abs_diff_eq!(
            censored.scale(),
            LENGTHS.iter().sum::<f64>() / 10.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_log_likelihood_is_sum_of_terms() {
        let mut flags = [false; 12];
        flags[11] = true;
        let fitted = fit("weibull_min", &LENGTHS, &flags);
        let sample = fitted.sample().clone();
        let expected = fitted.log_pdf(sample.complete_lengths()).iter().sum::<f64>()
            + fitted.log_sf(sample.censored_lengths()).iter().sum::<f64>();
        assert_abs_diff_eq!(fitted.max_log_likelihood(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_log_terms_are_zero() {
        let fitted = fit("gamma", &LENGTHS, &[false; 12]);
        assert_eq!(fitted.log_sf(&[]), vec![0.0]);
        assert_eq!(fitted.log_pdf(&[]), vec![0.0]);
    }

    #[test]
    fn test_quantiles_are_ordered() {
        let fitted = fit("gamma", &LENGTHS, &[false; 12]);
        assert!(fitted.b5() < fitted.median());
        assert!(fitted.median() < fitted.b95());
        assert_abs_diff_eq!(fitted.cdf(fitted.b95()), 0.95, epsilon = 1e-6);
    }

    #[test]
    fn test_mode_of_lognormal() {
        let fitted = fit("lognorm", &LENGTHS, &[false; 12]);
        let s = fitted.parameters()[0];
        let expected = fitted.scale() * (-s * s).exp();
        assert_abs_diff_eq!(fitted.mode().unwrap(), expected, epsilon = 1e-4);
    }

    #[test]
    fn test_refit_is_deterministic() {
        let a = fit("burr12", &LENGTHS, &[false; 12]);
        let b = fit("burr12", &LENGTHS, &[false; 12]);
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn test_fit_error_reports_family() {
        let err = FitError::NonFiniteLikelihood { family: "powerlaw" };
        assert_eq!(err.family(), "powerlaw");
        assert!(err.to_string().contains("powerlaw"));
    }
}
