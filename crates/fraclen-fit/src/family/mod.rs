//! Catalog of parametric length distributions.
//!
//! The fitting engine does not look distributions up by reflection: every
//! supported family is a type implementing [`DistributionFamily`], and the
//! registry returned by [`all_distribution_families`] is built once.
//!
//! # Two layers
//!
//! - [`DistributionFamily`] describes a family: its identifier, parameter
//!   layout, whether the location parameter is free, and how to map an
//!   unconstrained optimizer vector onto a valid parameter tuple.
//! - [`LengthDistribution`] is one concrete member of a family (a family
//!   instantiated with parameters). It evaluates densities, distribution
//!   functions, moments and quantiles.
//!
//! # Parameter tuples
//!
//! Parameters follow the `(shapes..., loc, scale)` layout. For every family
//! except [`Normal`](catalog::Normal) and [`Logistic`](catalog::Logistic) the
//! location is fixed at `0.0` during fitting.
//!
//! | id            | parameters           | free parameters |
//! |---------------|----------------------|-----------------|
//! | `lognorm`     | `(s, loc, scale)`    | 2 |
//! | `norm`        | `(loc, scale)`       | 2 |
//! | `expon`       | `(loc, scale)`       | 1 |
//! | `gamma`       | `(a, loc, scale)`    | 2 |
//! | `gengamma`    | `(a, c, loc, scale)` | 3 |
//! | `logistic`    | `(loc, scale)`       | 2 |
//! | `weibull_min` | `(c, loc, scale)`    | 2 |
//! | `burr12`      | `(c, d, loc, scale)` | 3 |
//! | `powerlaw`    | `(a, loc, scale)`    | 2 |

use std::{fmt, sync::LazyLock};

use crate::sample::CensoredSample;

pub use self::catalog::{
    Burr12, Exponential, GeneralizedGamma, GammaFamily, LogNormal, Logistic, Normal, PowerLaw,
    WeibullMin,
};

pub mod catalog;
pub mod model;

/// Parameters rejected by [`DistributionFamily::instantiate`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("invalid parameters {parameters:?} for '{family}'")]
pub struct ParameterError {
    pub family: &'static str,
    pub parameters: Vec<f64>,
}

/// One fitted member of a distribution family.
///
/// Points outside the support have density `0` (`ln_pdf = -inf`).
pub trait LengthDistribution: fmt::Debug + Send + Sync {
    #[must_use]
    fn clone_boxed(&self) -> BoxedLengthDistribution;

    #[must_use]
    fn ln_pdf(&self, x: f64) -> f64;

    #[must_use]
    fn pdf(&self, x: f64) -> f64 {
        self.ln_pdf(x).exp()
    }

    #[must_use]
    fn cdf(&self, x: f64) -> f64;

    #[must_use]
    fn sf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }

    #[must_use]
    fn ln_sf(&self, x: f64) -> f64 {
        self.sf(x).ln()
    }

    /// Inverse of the CDF for `p` in `[0, 1]`.
    #[must_use]
    fn quantile(&self, p: f64) -> f64;

    /// `None` when the mean does not exist.
    #[must_use]
    fn mean(&self) -> Option<f64>;

    /// `None` when the variance does not exist.
    #[must_use]
    fn variance(&self) -> Option<f64>;
}

pub type BoxedLengthDistribution = Box<dyn LengthDistribution>;

impl Clone for BoxedLengthDistribution {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// A parametric family that can be fitted to a [`CensoredSample`].
pub trait DistributionFamily: fmt::Debug + Send + Sync {
    /// Canonical identifier, e.g. `"lognorm"`.
    #[must_use]
    fn id(&self) -> &'static str;

    /// Human readable name, e.g. `"Log-normal"`.
    #[must_use]
    fn name(&self) -> &'static str;

    /// Alternative identifiers accepted by [`find_family`].
    #[must_use]
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Names of the full parameter tuple, location and scale last.
    #[must_use]
    fn parameter_names(&self) -> &'static [&'static str];

    /// Whether the location parameter is estimated (otherwise fixed at `0.0`).
    #[must_use]
    fn is_location_free(&self) -> bool {
        false
    }

    #[must_use]
    fn full_parameter_count(&self) -> usize {
        self.parameter_names().len()
    }

    /// Number of parameters actually estimated.
    #[must_use]
    fn free_parameter_count(&self) -> usize {
        if self.is_location_free() {
            self.full_parameter_count()
        } else {
            self.full_parameter_count() - 1
        }
    }

    #[must_use]
    fn clone_boxed(&self) -> BoxedDistributionFamily;

    /// Starting point of the likelihood search, in unconstrained coordinates.
    #[must_use]
    fn initial_guess(&self, sample: &CensoredSample) -> Vec<f64>;

    /// Maps unconstrained coordinates onto a full parameter tuple.
    #[must_use]
    fn parameters_from(&self, theta: &[f64], sample: &CensoredSample) -> Vec<f64>;

    /// Closed-form maximum-likelihood parameters, when the family has them.
    #[must_use]
    fn closed_form_fit(&self, _sample: &CensoredSample) -> Option<Vec<f64>> {
        None
    }

    /// Builds the distribution described by a full parameter tuple.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] if the tuple has the wrong size or a value
    /// lies outside the family's parameter space.
    fn instantiate(&self, parameters: &[f64]) -> Result<BoxedLengthDistribution, ParameterError>;
}

pub type BoxedDistributionFamily = Box<dyn DistributionFamily>;

impl Clone for BoxedDistributionFamily {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

static REGISTRY: LazyLock<Vec<BoxedDistributionFamily>> = LazyLock::new(|| {
    vec![
        Box::new(LogNormal),
        Box::new(Normal),
        Box::new(Exponential),
        Box::new(GammaFamily),
        Box::new(GeneralizedGamma),
        Box::new(Logistic),
        Box::new(WeibullMin),
        Box::new(Burr12),
        Box::new(PowerLaw),
    ]
});

/// Every supported family, in catalog order.
#[must_use]
pub fn all_distribution_families() -> &'static [BoxedDistributionFamily] {
    &REGISTRY
}

/// Looks a family up by identifier or alias (ASCII case-insensitive).
///
/// # Examples
///
/// ```
/// use fraclen_fit::family::find_family;
///
/// assert_eq!(find_family("Weibull").unwrap().id(), "weibull_min");
/// assert_eq!(find_family("normal").unwrap().id(), "norm");
/// assert!(find_family("cauchy").is_none());
/// ```
#[must_use]
pub fn find_family(name: &str) -> Option<&'static dyn DistributionFamily> {
    let name = name.trim();
    all_distribution_families()
        .iter()
        .find(|family| {
            family.id().eq_ignore_ascii_case(name)
                || family
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name))
        })
        .map(AsRef::as_ref)
}

/// Checks the size of a parameter tuple and that the `positive` indices are
/// finite and strictly positive. Remaining entries must be finite.
pub(crate) fn check_parameters(
    family: &'static str,
    parameters: &[f64],
    expected_len: usize,
    positive: &[usize],
) -> Result<(), ParameterError> {
    let valid = parameters.len() == expected_len
        && parameters.iter().all(|p| p.is_finite())
        && positive.iter().all(|&i| parameters[i] > 0.0);
    if valid {
        Ok(())
    } else {
        Err(ParameterError {
            family,
            parameters: parameters.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_ids_are_unique() {
        let families = all_distribution_families();
        for (i, a) in families.iter().enumerate() {
            for b in &families[i + 1..] {
                assert_ne!(a.id(), b.id());
            }
        }
        assert_eq!(families.len(), 9);
    }

    #[test]
    fn test_only_symmetric_families_have_free_location() {
        let free = all_distribution_families()
            .iter()
            .filter(|f| f.is_location_free())
            .map(|f| f.id())
            .collect::<Vec<_>>();
        assert_eq!(free, vec!["norm", "logistic"]);
    }

    #[test]
    fn test_free_parameter_counts() {
        let count = |id: &str| find_family(id).unwrap().free_parameter_count();
        assert_eq!(count("lognorm"), 2);
        assert_eq!(count("norm"), 2);
        assert_eq!(count("expon"), 1);
        assert_eq!(count("gamma"), 2);
        assert_eq!(count("gengamma"), 3);
        assert_eq!(count("logistic"), 2);
        assert_eq!(count("weibull_min"), 2);
        assert_eq!(count("burr12"), 3);
        assert_eq!(count("powerlaw"), 2);
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(find_family(" lognormal ").unwrap().id(), "lognorm");
        assert_eq!(find_family("EXPONENTIAL").unwrap().id(), "expon");
        assert_eq!(find_family("burr_xii").unwrap().id(), "burr12");
    }

    #[test]
    fn test_instantiate_rejects_wrong_size() {
        let family = find_family("gamma").unwrap();
        assert!(family.instantiate(&[1.0, 0.0]).is_err());
        assert!(family.instantiate(&[-1.0, 0.0, 1.0]).is_err());
        assert!(family.instantiate(&[2.0, 0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_boxed_clone_keeps_identity() {
        let family = all_distribution_families()[0].clone();
        assert_eq!(family.id(), "lognorm");
    }
}
