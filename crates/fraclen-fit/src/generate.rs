//! Synthetic censored samples for demonstrations and tests.
//!
//! Features with lognormal true lengths are dropped into a one-dimensional
//! survey window `[0, window)` at uniform start positions. A feature that
//! runs past the window edge is truncated there and tagged censored.
//!
//! The random generator is always passed in by the caller.

use rand::Rng;
use rand_distr::{Distribution as _, LogNormal, NormalError};

use crate::sample::{CensoredSample, DataError};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GenerateError {
    #[display("sample count must be positive")]
    EmptySample,
    #[display("survey window must be positive and finite, got {window}")]
    InvalidWindow { window: f64 },
    #[display("lognormal mu must be finite, got {mu}")]
    InvalidMu { mu: f64 },
    #[display("lognormal sigma must be positive and finite, got {sigma}")]
    InvalidSigma { sigma: f64 },
    #[display("invalid lognormal parameters: {_0}")]
    Distribution(NormalError),
    #[display("generated sample is unusable: {_0}")]
    Data(DataError),
}

/// Parameters of a synthetic survey.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSpec {
    /// Number of features.
    pub count: usize,
    /// Mean of the log of the true length.
    pub mu: f64,
    /// Standard deviation of the log of the true length.
    pub sigma: f64,
    /// Width of the survey window.
    pub window: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            count: 200,
            mu: 0.0,
            sigma: 0.75,
            window: 10.0,
        }
    }
}

/// Draws a censored sample according to `spec`.
///
/// # Errors
///
/// Returns [`GenerateError`] for invalid parameters or if every drawn
/// feature happens to be censored.
///
/// # Examples
///
/// ```
/// use fraclen_fit::generate::{SyntheticSpec, generate_censored_sample};
/// use rand::SeedableRng as _;
///
/// let mut rng = rand_pcg::Pcg64::seed_from_u64(7);
/// let sample = generate_censored_sample(&mut rng, &SyntheticSpec::default()).unwrap();
/// assert_eq!(sample.len(), 200);
/// assert!(sample.lengths().iter().all(|&x| x > 0.0 && x <= 10.0));
/// ```
pub fn generate_censored_sample<R>(
    rng: &mut R,
    spec: &SyntheticSpec,
) -> Result<CensoredSample, GenerateError>
where
    R: Rng + ?Sized,
{
    if spec.count == 0 {
        return Err(GenerateError::EmptySample);
    }
    if !(spec.window.is_finite() && spec.window > 0.0) {
        return Err(GenerateError::InvalidWindow {
            window: spec.window,
        });
    }
    if !spec.mu.is_finite() {
        return Err(GenerateError::InvalidMu { mu: spec.mu });
    }
    if !(spec.sigma.is_finite() && spec.sigma > 0.0) {
        return Err(GenerateError::InvalidSigma { sigma: spec.sigma });
    }
    let distribution = LogNormal::new(spec.mu, spec.sigma).map_err(GenerateError::Distribution)?;

    let observations = (0..spec.count).map(|_| {
        let length = distribution.sample(&mut *rng);
        let start = rng.random_range(0.0..spec.window);
        let visible = spec.window - start;
        if length > visible {
            (visible, true)
        } else {
            (length, false)
        }
    });
    let sample = CensoredSample::from_pairs(observations).map_err(GenerateError::Data)?;
    log::debug!(
        "generated {} lengths, {:.1}% censored",
        sample.len(),
        sample.censoring_percentage()
    );
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_same_seed_same_sample() {
        let spec = SyntheticSpec::default();
        let a = generate_censored_sample(&mut Pcg64::seed_from_u64(1), &spec).unwrap();
        let b = generate_censored_sample(&mut Pcg64::seed_from_u64(1), &spec).unwrap();
        assert_eq!(a.lengths(), b.lengths());
        assert_eq!(a.is_censored(), b.is_censored());
    }

    #[test]
    fn test_narrow_window_censors_more() {
        let mut rng = Pcg64::seed_from_u64(3);
        let wide = generate_censored_sample(
            &mut rng,
            &SyntheticSpec {
                window: 100.0,
                ..SyntheticSpec::default()
            },
        )
        .unwrap();
        let narrow = generate_censored_sample(
            &mut rng,
            &SyntheticSpec {
                window: 2.0,
                ..SyntheticSpec::default()
            },
        )
        .unwrap();
        assert!(narrow.censoring_percentage() > wide.censoring_percentage());
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = Pcg64::seed_from_u64(0);
        let spec = SyntheticSpec {
            count: 0,
            ..SyntheticSpec::default()
        };
        assert!(matches!(
            generate_censored_sample(&mut rng, &spec),
            Err(GenerateError::EmptySample)
        ));
        let spec = SyntheticSpec {
            window: -1.0,
            ..SyntheticSpec::default()
        };
        assert!(matches!(
            generate_censored_sample(&mut rng, &spec),
            Err(GenerateError::InvalidWindow { .. })
        ));
        let spec = SyntheticSpec {
            mu: f64::NAN,
            ..SyntheticSpec::default()
        };
        assert!(matches!(
            generate_censored_sample(&mut rng, &spec),
            Err(GenerateError::InvalidMu { .. })
        ));
    }

    #[test]
    fn test_sigma_must_be_positive() {
        let mut rng = Pcg64::seed_from_u64(0);
        for sigma in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let spec = SyntheticSpec {
                sigma,
                ..SyntheticSpec::default()
            };
            assert!(
                matches!(
                    generate_censored_sample(&mut rng, &spec),
                    Err(GenerateError::InvalidSigma { .. })
                ),
                "{sigma}"
            );
        }
    }
}
