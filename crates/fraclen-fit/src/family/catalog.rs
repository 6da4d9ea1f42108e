//! The fixed catalog of length distribution families.
//!
//! Strictly positive parameters are optimized on a log scale, so every
//! point the optimizer visits maps to a valid parameter tuple.

use std::{f64::consts::PI, ops::RangeInclusive};

use statrs::distribution::{Exp, Gamma, LogNormal as LogNormalDist, Normal as NormalDist, Weibull};

use super::{
    BoxedDistributionFamily, BoxedLengthDistribution, DistributionFamily, ParameterError,
    check_parameters,
    model::{Burr12Model, GeneralizedGammaModel, LogisticModel, PowerLawModel, Shifted},
};
use crate::sample::CensoredSample;

/// `(mean, std)` of all lengths, with a usable spread for degenerate samples.
fn location_and_spread(sample: &CensoredSample) -> (f64, f64) {
    let mean = sample.mean();
    let std = sample.std();
    let std = if std > 0.0 { std } else { 0.1 * mean };
    (mean, std)
}

/// Method-of-moments gamma estimate `(shape, scale)`.
fn gamma_moments(sample: &CensoredSample) -> (f64, f64) {
    let (mean, std) = location_and_spread(sample);
    let var = std * std;
    (mean * mean / var, var / mean)
}

/// Weibull shape from the coefficient of variation (Justus approximation).
fn weibull_shape(sample: &CensoredSample) -> f64 {
    let (mean, std) = location_and_spread(sample);
    (std / mean).powf(-1.086)
}

/// `(mean, std)` of the log lengths, with a usable spread for degenerate samples.
#[expect(clippy::cast_precision_loss)]
fn log_location_and_spread(sample: &CensoredSample) -> (f64, f64) {
    let logs = sample.lengths().iter().map(|x| x.ln()).collect::<Vec<_>>();
    let n = logs.len() as f64;
    let mean = logs.iter().sum::<f64>() / n;
    let var = logs.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
    let std = if var > 0.0 { var.sqrt() } else { 0.1 };
    (mean, std)
}

fn parameter_error(family: &'static str, parameters: &[f64]) -> ParameterError {
    ParameterError {
        family,
        parameters: parameters.to_vec(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LogNormal;

impl DistributionFamily for LogNormal {
    fn id(&self) -> &'static str {
        "lognorm"
    }

    fn name(&self) -> &'static str {
        "Log-normal"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["lognormal"]
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["s", "loc", "scale"]
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64> {
        let (mu, s) = log_location_and_spread(sample);
        vec![s.ln(), mu]
    }

    fn parameters_from(&self, theta: &[f64], _sample: &CensoredSample) -> Vec<f64> {
        vec![theta[0].exp(), 0.0, theta[1].exp()]
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 3, &[0, 2])?;
        let (s, loc, scale) = (parameters[0], parameters[1], parameters[2]);
        let dist =
            LogNormalDist::new(scale.ln(), s).map_err(|_| parameter_error(self.id(), parameters))?;
        Ok(Box::new(Shifted::new(dist, loc)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Normal;

impl DistributionFamily for Normal {
    fn id(&self) -> &'static str {
        "norm"
    }

    fn name(&self) -> &'static str {
        "Normal"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["normal"]
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["loc", "scale"]
    }

    fn is_location_free(&self) -> bool {
        true
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64> {
        let (mean, std) = location_and_spread(sample);
        vec![mean, std.ln()]
    }

    fn parameters_from(&self, theta: &[f64], _sample: &CensoredSample) -> Vec<f64> {
        vec![theta[0], theta[1].exp()]
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 2, &[1])?;
        let dist = NormalDist::new(parameters[0], parameters[1])
            .map_err(|_| parameter_error(self.id(), parameters))?;
        Ok(Box::new(Shifted::new(dist, 0.0)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Exponential;

impl DistributionFamily for Exponential {
    fn id(&self) -> &'static str {
        "expon"
    }

    fn name(&self) -> &'static str {
        "Exponential"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["exponential"]
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["loc", "scale"]
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64> {
        vec![sample.mean().ln()]
    }

    fn parameters_from(&self, theta: &[f64], _sample: &CensoredSample) -> Vec<f64> {
        vec![0.0, theta[0].exp()]
    }

    /// Total time on test divided by the number of events.
    #[expect(clippy::cast_precision_loss)]
    fn closed_form_fit(&self, sample: &CensoredSample) -> Option<Vec<f64>> {
        let total = sample.lengths().iter().sum::<f64>();
        Some(vec![0.0, total / sample.complete_count() as f64])
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 2, &[1])?;
        let dist =
            Exp::new(1.0 / parameters[1]).map_err(|_| parameter_error(self.id(), parameters))?;
        Ok(Box::new(Shifted::new(dist, parameters[0])))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GammaFamily;

impl DistributionFamily for GammaFamily {
    fn id(&self) -> &'static str {
        "gamma"
    }

    fn name(&self) -> &'static str {
        "Gamma"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["a", "loc", "scale"]
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64> {
        let (shape, scale) = gamma_moments(sample);
        vec![shape.ln(), scale.ln()]
    }

    fn parameters_from(&self, theta: &[f64], _sample: &CensoredSample) -> Vec<f64> {
        vec![theta[0].exp(), 0.0, theta[1].exp()]
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 3, &[0, 2])?;
        let (a, loc, scale) = (parameters[0], parameters[1], parameters[2]);
        let dist = Gamma::new(a, 1.0 / scale).map_err(|_| parameter_error(self.id(), parameters))?;
        Ok(Box::new(Shifted::new(dist, loc)))
    }
}

/// Admissible generalized gamma shape `a`.
///
/// Large `a` approaches the lognormal limit.
pub const GENGAMMA_SHAPE_RANGE: RangeInclusive<f64> = 1e-3..=1e2;

/// Admissible Burr XII shape `d`. Large `d` approaches the Weibull limit.
pub const BURR12_SHAPE_RANGE: RangeInclusive<f64> = 1e-3..=1e2;

/// Generalized gamma with `loc = 0`.
///
/// The optimizer works on `(mu, ln sigma, ln q)`, where `mu` and `sigma`
/// are the location and scale of `ln x` and `q` sets the shape:
/// `a = 1 / q^2`, `c = q / sigma` and `scale = exp(mu + 2 (sigma / q) ln q)`.
#[derive(Debug, Clone, Copy)]
pub struct GeneralizedGamma;

impl DistributionFamily for GeneralizedGamma {
    fn id(&self) -> &'static str {
        "gengamma"
    }

    fn name(&self) -> &'static str {
        "Generalized gamma"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["generalized_gamma"]
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["a", "c", "loc", "scale"]
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64> {
        let (mu, sigma) = log_location_and_spread(sample);
        vec![mu, sigma.ln(), 0.5_f64.ln()]
    }

    fn parameters_from(&self, theta: &[f64], _sample: &CensoredSample) -> Vec<f64> {
        let (mu, sigma, q) = (theta[0], theta[1].exp(), theta[2].exp());
        let scale = (mu + 2.0 * sigma / q * q.ln()).exp();
        vec![1.0 / (q * q), q / sigma, 0.0, scale]
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 4, &[0, 1, 3])?;
        let (a, c, loc, scale) = (parameters[0], parameters[1], parameters[2], parameters[3]);
        if !GENGAMMA_SHAPE_RANGE.contains(&a) {
            return Err(parameter_error(self.id(), parameters));
        }
        let dist = GeneralizedGammaModel::new(a, c, loc, scale)
            .ok_or_else(|| parameter_error(self.id(), parameters))?;
        Ok(Box::new(dist))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Logistic;

impl DistributionFamily for Logistic {
    fn id(&self) -> &'static str {
        "logistic"
    }

    fn name(&self) -> &'static str {
        "Logistic"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["loc", "scale"]
    }

    fn is_location_free(&self) -> bool {
        true
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64> {
        let (mean, std) = location_and_spread(sample);
        vec![mean, (std * 3f64.sqrt() / PI).ln()]
    }

    fn parameters_from(&self, theta: &[f64], _sample: &CensoredSample) -> Vec<f64> {
        vec![theta[0], theta[1].exp()]
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 2, &[1])?;
        Ok(Box::new(LogisticModel {
            loc: parameters[0],
            scale: parameters[1],
        }))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WeibullMin;

impl DistributionFamily for WeibullMin {
    fn id(&self) -> &'static str {
        "weibull_min"
    }

    fn name(&self) -> &'static str {
        "Weibull"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["weibull"]
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["c", "loc", "scale"]
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64> {
        vec![weibull_shape(sample).ln(), sample.mean().ln()]
    }

    fn parameters_from(&self, theta: &[f64], _sample: &CensoredSample) -> Vec<f64> {
        vec![theta[0].exp(), 0.0, theta[1].exp()]
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 3, &[0, 2])?;
        let (c, loc, scale) = (parameters[0], parameters[1], parameters[2]);
        let dist = Weibull::new(c, scale).map_err(|_| parameter_error(self.id(), parameters))?;
        Ok(Box::new(Shifted::new(dist, loc)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Burr12;

impl DistributionFamily for Burr12 {
    fn id(&self) -> &'static str {
        "burr12"
    }

    fn name(&self) -> &'static str {
        "Burr XII"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["burr_xii"]
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["c", "d", "loc", "scale"]
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64> {
        // with d = 1 the scale is the median
        vec![weibull_shape(sample).ln(), 0.0, sample.median().ln()]
    }

    fn parameters_from(&self, theta: &[f64], _sample: &CensoredSample) -> Vec<f64> {
        vec![theta[0].exp(), theta[1].exp(), 0.0, theta[2].exp()]
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 4, &[0, 1, 3])?;
        let (c, d, loc, scale) = (parameters[0], parameters[1], parameters[2], parameters[3]);
        if !BURR12_SHAPE_RANGE.contains(&d) {
            return Err(parameter_error(self.id(), parameters));
        }
        Ok(Box::new(Burr12Model { c, d, loc, scale }))
    }
}

/// Power-function distribution.
///
/// The support ends at `scale`, which must exceed the longest length or
/// censored lengths at the maximum would have zero survival. The scale is
/// therefore parametrized as `max_length * (1 + e^theta)`.
#[derive(Debug, Clone, Copy)]
pub struct PowerLaw;

impl DistributionFamily for PowerLaw {
    fn id(&self) -> &'static str {
        "powerlaw"
    }

    fn name(&self) -> &'static str {
        "Power law"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["power_law"]
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["a", "loc", "scale"]
    }

    fn clone_boxed(&self) -> BoxedDistributionFamily {
        Box::new(*self)
    }

    fn initial_guess(&self, _sample: &CensoredSample) -> Vec<f64> {
        vec![0.0, 0.01f64.ln()]
    }

    fn parameters_from(&self, theta: &[f64], sample: &CensoredSample) -> Vec<f64> {
        let max = sample.descriptive_stats().max;
        vec![theta[0].exp(), 0.0, max * (1.0 + theta[1].exp())]
    }

    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError> {
        check_parameters(self.id(), parameters, 3, &[0, 2])?;
        let (a, loc, scale) = (parameters[0], parameters[1], parameters[2]);
        Ok(Box::new(PowerLawModel { a, loc, scale }))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::family::all_distribution_families;

    fn sample() -> CensoredSample {
        CensoredSample::new(
            &[0.8, 1.1, 1.9, 2.4, 3.0, 3.7, 5.2, 6.0],
            &[false, false, false, true, false, false, false, true],
        )
        .unwrap()
    }

    #[test]
    fn test_initial_guess_maps_to_valid_parameters() {
        let sample = sample();
        for family in all_distribution_families() {
            let theta = family.initial_guess(&sample);
            assert_eq!(theta.len(), family.free_parameter_count(), "{}", family.id());
            let parameters = family.parameters_from(&theta, &sample);
            assert_eq!(parameters.len(), family.full_parameter_count());
            let dist = family.instantiate(&parameters).unwrap();
            for &x in sample.lengths() {
                assert!(dist.cdf(x).is_finite(), "{} cdf({x})", family.id());
            }
        }
    }

    #[test]
    fn test_fixed_location_is_zero() {
        let sample = sample();
        for family in all_distribution_families() {
            let names = family.parameter_names();
            let loc_index = names.iter().position(|n| *n == "loc").unwrap();
            assert_eq!(loc_index, names.len() - 2);
            if !family.is_location_free() {
                let theta = family.initial_guess(&sample);
                let parameters = family.parameters_from(&theta, &sample);
                assert_eq!(parameters[loc_index], 0.0, "{}", family.id());
            }
        }
    }

    #[test]
    fn test_exponential_closed_form() {
        let sample = sample();
        let parameters = Exponential.closed_form_fit(&sample).unwrap();
        let total: f64 = sample.lengths().iter().sum();
        assert_abs_diff_eq!(parameters[1], total / 6.0, epsilon = 1e-12);
        assert_eq!(parameters[0], 0.0);
    }

    #[test]
    fn test_power_law_support_covers_sample() {
        let sample = sample();
        let parameters = PowerLaw.parameters_from(&[0.0, -5.0], &sample);
        assert!(parameters[2] > 6.0);
        let dist = PowerLaw.instantiate(&parameters).unwrap();
        assert!(dist.ln_sf(6.0) > f64::NEG_INFINITY);
    }

    #[test]
    fn test_gengamma_log_coordinates() {
        let half = 0.5_f64.ln();
        let parameters = GeneralizedGamma.parameters_from(&[0.0, half, half], &sample());
        assert_abs_diff_eq!(parameters[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(parameters[1], 1.0, epsilon = 1e-12);
        assert_eq!(parameters[2], 0.0);
        assert_abs_diff_eq!(parameters[3], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_gengamma_shape_outside_range_is_rejected() {
        assert!(GeneralizedGamma.instantiate(&[1e3, 1.0, 0.0, 1.0]).is_err());
        assert!(GeneralizedGamma.instantiate(&[1e-4, 1.0, 0.0, 1.0]).is_err());
        assert!(GeneralizedGamma.instantiate(&[50.0, 1.0, 0.0, 1.0]).is_ok());
        assert!(Burr12.instantiate(&[2.0, 1e3, 0.0, 1.0]).is_err());
        assert!(Burr12.instantiate(&[2.0, 50.0, 0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_lognormal_median_is_scale() {
        let dist = LogNormal.instantiate(&[0.5, 0.0, 3.0]).unwrap();
        assert_abs_diff_eq!(dist.quantile(0.5), 3.0, epsilon = 1e-9);
    }
}
