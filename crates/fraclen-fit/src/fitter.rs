//! Fits candidate families to one sample and keeps them ranked.
//!
//! Every successful [`DistributionFitter::fit`] appends one [`FitRecord`] and
//! then recomputes the derived columns of *all* rows: a new candidate can
//! lower the minimum criterion value, which shifts every `delta_i`, every
//! Akaike weight and every rank.
//!
//! # Ranking
//!
//! Ranks are ordinal, not dense: 1 for the best (smallest) value, and tied
//! values still get distinct ranks in insertion order. Two rows with the same
//! KS distance are ranked 1 and 2, never 1 and 1, so each rank column is a
//! permutation of `1..=N` and `mean_rank` averages positions. Rows whose
//! criterion is undefined
//! ([`INVALID_CRITERION`](crate::metrics::INVALID_CRITERION)) get
//! `delta_i = +inf`, an Akaike weight of 0 and the last criterion ranks, and
//! are never returned by [`DistributionFitter::best_fit`].

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use fraclen_stats::optimize::NelderMeadOptions;

use crate::{
    distribution::{FitError, FittedDistribution},
    family::find_family,
    metrics::{GoodnessOfFit, InformationCriterion},
    sample::CensoredSample,
};

/// Query for a family that was never fitted.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("distribution '{name}' has not been fitted")]
pub struct NotFittedError {
    pub name: String,
}

/// Column to order [`DistributionFitter::fit_records`] by.
///
/// Every ordering puts the best row first: ascending for criterion, deltas,
/// distances and mean rank, descending for weight and log-likelihood.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum SortBy {
    #[default]
    Criterion,
    Delta,
    Weight,
    LogLikelihood,
    Ks,
    Kg,
    Ad,
    MeanRank,
    Name,
}

/// One row of the result table.
#[derive(Debug, Clone)]
pub struct FitRecord {
    pub name: &'static str,
    /// Value of the fitter's information criterion.
    pub criterion_value: f64,
    /// `false` if [`Self::criterion_value`] is the invalid sentinel.
    pub criterion_valid: bool,
    pub delta_i: f64,
    pub akaike_weight: f64,
    pub log_likelihood: f64,
    pub ks_distance: f64,
    pub kg_distance: f64,
    pub ad_distance: f64,
    pub criterion_rank: usize,
    pub ks_rank: usize,
    pub kg_rank: usize,
    pub ad_rank: usize,
    pub mean_rank: f64,
    pub goodness_of_fit: GoodnessOfFit,
    pub fitted: FittedDistribution,
}

impl FitRecord {
    fn new(
        fitted: FittedDistribution,
        goodness_of_fit: GoodnessOfFit,
        criterion: InformationCriterion,
    ) -> Self {
        Self {
            name: fitted.distribution_name(),
            criterion_value: goodness_of_fit.criterion(criterion),
            criterion_valid: goodness_of_fit.is_criterion_valid(criterion),
            delta_i: f64::NAN,
            akaike_weight: f64::NAN,
            log_likelihood: fitted.max_log_likelihood(),
            ks_distance: goodness_of_fit.ks_distance,
            kg_distance: goodness_of_fit.kg_distance,
            ad_distance: goodness_of_fit.ad_distance,
            criterion_rank: 0,
            ks_rank: 0,
            kg_rank: 0,
            ad_rank: 0,
            mean_rank: f64::NAN,
            goodness_of_fit,
            fitted,
        }
    }

    fn compare_criterion(&self, other: &Self) -> Ordering {
        other
            .criterion_valid
            .cmp(&self.criterion_valid)
            .then(self.criterion_value.total_cmp(&other.criterion_value))
    }

    fn compare_by(&self, other: &Self, sort_by: SortBy) -> Ordering {
        match sort_by {
            SortBy::Criterion => self.compare_criterion(other),
            SortBy::Delta => self.delta_i.total_cmp(&other.delta_i),
            SortBy::Weight => other.akaike_weight.total_cmp(&self.akaike_weight),
            SortBy::LogLikelihood => other.log_likelihood.total_cmp(&self.log_likelihood),
            SortBy::Ks => self.ks_distance.total_cmp(&other.ks_distance),
            SortBy::Kg => self.kg_distance.total_cmp(&other.kg_distance),
            SortBy::Ad => self.ad_distance.total_cmp(&other.ad_distance),
            SortBy::MeanRank => self.mean_rank.total_cmp(&other.mean_rank),
            SortBy::Name => self.name.cmp(other.name),
        }
    }
}

/// Ordinal ranks (1-based) of `rows` under `compare`; ties keep row order.
fn ordinal_ranks<F>(rows: &[FitRecord], mut compare: F) -> Vec<usize>
where
    F: FnMut(&FitRecord, &FitRecord) -> Ordering,
{
    let mut order = (0..rows.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| compare(&rows[a], &rows[b]));
    let mut ranks = vec![0; rows.len()];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}

#[derive(Debug, Clone)]
pub struct DistributionFitter {
    sample: Arc<CensoredSample>,
    criterion: InformationCriterion,
    options: NelderMeadOptions,
    records: Vec<FitRecord>,
    rows_by_name: HashMap<&'static str, Vec<usize>>,
    failures: Vec<FitError>,
}

impl DistributionFitter {
    /// Creates a fitter ranking by AICc.
    #[must_use]
    pub fn new(sample: CensoredSample) -> Self {
        Self::with_criterion(sample, InformationCriterion::default())
    }

    #[must_use]
    pub fn with_criterion(sample: CensoredSample, criterion: InformationCriterion) -> Self {
        Self {
            sample: Arc::new(sample),
            criterion,
            options: NelderMeadOptions::default(),
            records: vec![],
            rows_by_name: HashMap::new(),
            failures: vec![],
        }
    }

    /// Replaces the optimizer settings used by subsequent fits.
    #[must_use]
    pub fn with_options(mut self, options: NelderMeadOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn sample(&self) -> &CensoredSample {
        &self.sample
    }

    #[must_use]
    pub fn criterion(&self) -> InformationCriterion {
        self.criterion
    }

    /// Number of rows in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fits the family named `name` (identifier or alias) and appends a row.
    ///
    /// Fitting the same family again appends another row.
    ///
    /// # Errors
    ///
    /// Returns [`FitError`] if the name is unknown or the fit fails. The error
    /// is also kept in [`Self::failures`] and the table is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use fraclen_fit::{fitter::DistributionFitter, sample::CensoredSample};
    ///
    /// let sample = CensoredSample::new(
    ///     &[1.2, 0.7, 3.4, 2.2, 5.1, 1.9, 0.9, 2.8],
    ///     &[false, false, true, false, true, false, false, false],
    /// )
    /// .unwrap();
    /// let mut fitter = DistributionFitter::new(sample);
    /// fitter.fit("lognorm").unwrap();
    /// fitter.fit("expon").unwrap();
    ///
    /// let weights: f64 = fitter.records().iter().map(|r| r.akaike_weight).sum();
    /// assert!((weights - 1.0).abs() < 1e-12);
    /// assert!(fitter.best_fit().is_some());
    /// ```
    pub fn fit(&mut self, name: &str) -> Result<&FitRecord, FitError> {
        match self.try_fit(name) {
            Ok(record) => {
                log::debug!(
                    "{}: {} = {}",
                    record.name,
                    self.criterion,
                    record.criterion_value
                );
                let index = self.records.len();
                self.rows_by_name.entry(record.name).or_default().push(index);
                self.records.push(record);
                self.recompute_derived_columns();
                Ok(&self.records[index])
            }
            Err(err) => {
                log::warn!("fitting '{name}' failed: {err}");
                self.failures.push(err.clone());
                Err(err)
            }
        }
    }

    fn try_fit(&self, name: &str) -> Result<FitRecord, FitError> {
        let family = find_family(name).ok_or_else(|| FitError::UnknownFamily {
            name: name.to_owned(),
        })?;
        let fitted =
            FittedDistribution::fit_with_options(family, Arc::clone(&self.sample), &self.options)?;
        let goodness_of_fit = GoodnessOfFit::compute(&fitted);
        Ok(FitRecord::new(fitted, goodness_of_fit, self.criterion))
    }

    /// Fits every family in `names`, continuing past failures.
    ///
    /// Returns the errors of this call; they are also appended to
    /// [`Self::failures`].
    pub fn fit_all<'a, I>(&mut self, names: I) -> Vec<FitError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.fit(name).err())
            .collect()
    }

    /// Recomputes `delta_i`, Akaike weights and every rank column over the
    /// whole table.
    #[expect(clippy::cast_precision_loss)]
    pub fn recompute_derived_columns(&mut self) {
        if self.records.is_empty() {
            return;
        }

        let min = self
            .records
            .iter()
            .filter(|r| r.criterion_valid)
            .map(|r| r.criterion_value)
            .fold(f64::INFINITY, f64::min);
        for record in &mut self.records {
            record.delta_i = if record.criterion_valid {
                record.criterion_value - min
            } else {
                f64::INFINITY
            };
        }

        let total = self
            .records
            .iter()
            .map(|r| (-r.delta_i / 2.0).exp())
            .sum::<f64>();
        let uniform = 1.0 / self.records.len() as f64;
        for record in &mut self.records {
            record.akaike_weight = if total > 0.0 {
                (-record.delta_i / 2.0).exp() / total
            } else {
                uniform
            };
        }

        let criterion_ranks = ordinal_ranks(&self.records, FitRecord::compare_criterion);
        let ks_ranks = ordinal_ranks(&self.records, |a, b| a.compare_by(b, SortBy::Ks));
        let kg_ranks = ordinal_ranks(&self.records, |a, b| a.compare_by(b, SortBy::Kg));
        let ad_ranks = ordinal_ranks(&self.records, |a, b| a.compare_by(b, SortBy::Ad));
        for (i, record) in self.records.iter_mut().enumerate() {
            record.criterion_rank = criterion_ranks[i];
            record.ks_rank = ks_ranks[i];
            record.kg_rank = kg_ranks[i];
            record.ad_rank = ad_ranks[i];
            record.mean_rank =
                (criterion_ranks[i] + ks_ranks[i] + kg_ranks[i] + ad_ranks[i]) as f64 / 4.0;
        }
    }

    /// Rows in insertion order.
    #[must_use]
    pub fn records(&self) -> &[FitRecord] {
        &self.records
    }

    /// Rows ordered by `sort_by`, best first (stable).
    #[must_use]
    pub fn fit_records(&self, sort_by: SortBy) -> Vec<&FitRecord> {
        let mut rows = self.records.iter().collect::<Vec<_>>();
        rows.sort_by(|a, b| a.compare_by(b, sort_by));
        rows
    }

    /// Every fit that failed, in order.
    #[must_use]
    pub fn failures(&self) -> &[FitError] {
        &self.failures
    }

    /// Best-ranked row of the family `name` (identifier or alias).
    ///
    /// # Errors
    ///
    /// Returns [`NotFittedError`] if the family has no row.
    pub fn get_record(&self, name: &str) -> Result<&FitRecord, NotFittedError> {
        let id = find_family(name).map_or(name, |family| family.id());
        self.rows_by_name
            .get(id)
            .and_then(|rows| {
                rows.iter()
                    .map(|&i| &self.records[i])
                    .min_by(|a, b| a.compare_criterion(b))
            })
            .ok_or_else(|| NotFittedError {
                name: name.to_owned(),
            })
    }

    /// # Errors
    ///
    /// Returns [`NotFittedError`] if the family has no row.
    pub fn get_fitted_distribution(&self, name: &str) -> Result<&FittedDistribution, NotFittedError> {
        self.get_record(name).map(|record| &record.fitted)
    }

    /// # Errors
    ///
    /// Returns [`NotFittedError`] if the family has no row.
    pub fn get_fitted_parameters(&self, name: &str) -> Result<&[f64], NotFittedError> {
        self.get_record(name).map(|record| record.fitted.parameters())
    }

    /// Row with the best valid information criterion, if any.
    #[must_use]
    pub fn best_fit(&self) -> Option<&FitRecord> {
        self.records
            .iter()
            .filter(|r| r.criterion_valid)
            .min_by(|a, b| a.compare_criterion(b))
    }
}
