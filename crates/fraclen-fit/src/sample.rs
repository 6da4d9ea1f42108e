//! Length measurements with right-censoring flags
//!
//! A [`CensoredSample`] is the only input the fitting engine needs. Each
//! fracture trace contributes one length; traces cut by the survey boundary
//! are flagged as censored, meaning their true length is at least the
//! recorded one.
//!
//! ```text
//! Complete:  |----x      (both tips observed)
//! Censored:  |-------|>  (one tip beyond the boundary, true length unknown)
//! ```
//!
//! # Descriptive vs. distribution-aware statistics
//!
//! [`CensoredSample::mean`], [`CensoredSample::median`] and friends are
//! computed over *all* lengths at face value. They describe the measured
//! traces and are biased low when censoring is heavy. The Kaplan-Meier curve
//! ([`CensoredSample::empirical_cdf`]) and the fitted models account for
//! censoring.
//!
//! # Serialization
//!
//! [`LengthDataset`] is the JSON exchange format:
//!
//! ```json
//! {
//!   "lengths": [1.2, 3.4, 0.8],
//!   "censored": [0, 1, 0]
//! }
//! ```

use std::sync::OnceLock;

use fraclen_stats::{
    descriptive::DescriptiveStats,
    percentiles::compute_percentile,
    survival::{EmpiricalCurve, kaplan_meier, sort_observations},
};
use serde::{Deserialize, Serialize};

/// Malformed input sample.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DataError {
    #[display("{lengths} lengths but {flags} censoring flags")]
    LengthMismatch { lengths: usize, flags: usize },
    #[display("length at index {index} must be positive and finite, got {value}")]
    NonPositiveLength { index: usize, value: f64 },
    #[display("censoring flag at index {index} must be 0 or 1, got {value}")]
    InvalidFlag { index: usize, value: u8 },
    #[display("sample contains no complete (uncensored) lengths")]
    NoCompleteObservations,
}

/// Right-censored length sample, sorted ascending.
///
/// At equal lengths complete observations are ordered before censored ones.
/// Immutable after construction; the Kaplan-Meier curves are computed on
/// first use and cached.
#[derive(Debug, Clone)]
pub struct CensoredSample {
    lengths: Vec<f64>,
    is_censored: Vec<bool>,
    complete_lengths: Vec<f64>,
    censored_lengths: Vec<f64>,
    stats: DescriptiveStats,
    empirical_cdf: OnceLock<EmpiricalCurve>,
    empirical_sf: OnceLock<EmpiricalCurve>,
}

impl CensoredSample {
    /// Builds a sample from parallel length and censoring arrays.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the arrays differ in size, a length is not
    /// strictly positive and finite, or no length is complete.
    ///
    /// # Examples
    ///
    /// ```
    /// use fraclen_fit::sample::CensoredSample;
    ///
    /// let sample = CensoredSample::new(&[3.0, 1.0, 10.0, 2.0], &[false, false, true, false]).unwrap();
    /// assert_eq!(sample.lengths(), &[1.0, 2.0, 3.0, 10.0]);
    /// assert_eq!(sample.censored_lengths(), &[10.0]);
    /// assert_eq!(sample.censoring_percentage(), 25.0);
    /// ```
    pub fn new(lengths: &[f64], is_censored: &[bool]) -> Result<Self, DataError> {
        if lengths.len() != is_censored.len() {
            return Err(DataError::LengthMismatch {
                lengths: lengths.len(),
                flags: is_censored.len(),
            });
        }
        Self::from_pairs(lengths.iter().copied().zip(is_censored.iter().copied()))
    }

    /// Builds a sample from `(length, is_censored)` pairs.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_pairs<I>(pairs: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (f64, bool)>,
    {
        let mut observations = pairs.into_iter().collect::<Vec<_>>();
        if let Some((index, &(value, _))) = observations
            .iter()
            .enumerate()
            .find(|(_, (length, _))| !(length.is_finite() && *length > 0.0))
        {
            return Err(DataError::NonPositiveLength { index, value });
        }
        if observations.iter().all(|(_, censored)| *censored) {
            return Err(DataError::NoCompleteObservations);
        }

        sort_observations(&mut observations);

        let (lengths, is_censored): (Vec<f64>, Vec<bool>) = observations.iter().copied().unzip();
        let (censored, complete): (Vec<_>, Vec<_>) =
            observations.iter().copied().partition(|(_, censored)| *censored);
        let stats =
            DescriptiveStats::from_sorted(&lengths).ok_or(DataError::NoCompleteObservations)?;

        Ok(Self {
            lengths,
            is_censored,
            complete_lengths: complete.into_iter().map(|(length, _)| length).collect(),
            censored_lengths: censored.into_iter().map(|(length, _)| length).collect(),
            stats,
            empirical_cdf: OnceLock::new(),
            empirical_sf: OnceLock::new(),
        })
    }

    /// Builds a sample from 0/1 censoring flags.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidFlag`] for flags other than 0 and 1, and
    /// the errors of [`Self::new`].
    pub fn from_flags(lengths: &[f64], flags: &[u8]) -> Result<Self, DataError> {
        let is_censored = flags
            .iter()
            .enumerate()
            .map(|(index, &value)| match value {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(DataError::InvalidFlag { index, value }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(lengths, &is_censored)
    }

    /// All lengths, sorted ascending.
    #[must_use]
    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Censoring flags parallel to [`Self::lengths`].
    #[must_use]
    pub fn is_censored(&self) -> &[bool] {
        &self.is_censored
    }

    #[must_use]
    pub fn complete_lengths(&self) -> &[f64] {
        &self.complete_lengths
    }

    #[must_use]
    pub fn censored_lengths(&self) -> &[f64] {
        &self.censored_lengths
    }

    /// Total number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Always `false`: a sample holds at least one complete length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    #[must_use]
    pub fn complete_count(&self) -> usize {
        self.complete_lengths.len()
    }

    #[must_use]
    pub fn censored_count(&self) -> usize {
        self.censored_lengths.len()
    }

    /// Share of censored observations, in percent.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn censoring_percentage(&self) -> f64 {
        100.0 * self.censored_count() as f64 / self.len() as f64
    }

    /// Face-value descriptive statistics over all lengths.
    #[must_use]
    pub fn descriptive_stats(&self) -> &DescriptiveStats {
        &self.stats
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.stats.mean
    }

    /// Population standard deviation over all lengths.
    #[must_use]
    pub fn std(&self) -> f64 {
        self.stats.std_dev
    }

    /// Population variance over all lengths.
    #[must_use]
    pub fn var(&self) -> f64 {
        self.stats.variance
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        self.stats.median
    }

    #[must_use]
    pub fn mode(&self) -> f64 {
        self.stats.mode
    }

    /// Linearly interpolated percentile over all lengths (`p` in `[0, 100]`).
    #[must_use]
    pub fn percentile(&self, p: f64) -> f64 {
        compute_percentile(&self.lengths, p)
    }

    /// Kaplan-Meier CDF evaluated at every length.
    #[must_use]
    pub fn empirical_cdf(&self) -> &EmpiricalCurve {
        self.empirical_cdf
            .get_or_init(|| kaplan_meier(&self.lengths, &self.lengths, &self.is_censored))
    }

    /// Kaplan-Meier survival function evaluated at every length.
    #[must_use]
    pub fn empirical_sf(&self) -> &EmpiricalCurve {
        self.empirical_sf
            .get_or_init(|| self.empirical_cdf().survival())
    }
}

/// JSON representation of a censored length sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LengthDataset {
    /// Measured lengths.
    pub lengths: Vec<f64>,
    /// 1 where the matching length is censored, 0 otherwise.
    pub censored: Vec<u8>,
}

impl TryFrom<&LengthDataset> for CensoredSample {
    type Error = DataError;

    fn try_from(dataset: &LengthDataset) -> Result<Self, Self::Error> {
        Self::from_flags(&dataset.lengths, &dataset.censored)
    }
}

impl From<&CensoredSample> for LengthDataset {
    fn from(sample: &CensoredSample) -> Self {
        Self {
            lengths: sample.lengths.clone(),
            censored: sample.is_censored.iter().map(|&c| u8::from(c)).collect(),
        }
    }
}
