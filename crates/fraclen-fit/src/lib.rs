//! Censored fracture-length distribution fitting and model ranking.
//!
//! Traces of fractures mapped inside a survey area are either *complete*
//! (both tips observed) or *censored* (cut by the survey boundary, so the true
//! length is only known to be at least the recorded one). This crate fits
//! parametric length distributions to such data by maximum likelihood and
//! ranks the candidates by information criteria and EDF distances.
//!
//! # Pipeline
//!
//! ```text
//! lengths + censoring flags
//!   -> CensoredSample            (sample)
//!   -> FittedDistribution        (distribution, one per family)
//!   -> GoodnessOfFit             (metrics, against the Kaplan-Meier CDF)
//!   -> FitRecord in the table    (fitter, re-ranked after every fit)
//!   -> CSV / text table          (export)
//! ```
//!
//! # Modules
//!
//! - [`sample`]: Validated length sample with censoring flags
//! - [`family`]: Registry of supported distribution families
//! - [`distribution`]: Maximum-likelihood fit of one family
//! - [`metrics`]: AIC/AICc/BIC and the KS, Koziol-Green and Anderson-Darling distances
//! - [`fitter`]: Ranked result table over many families
//! - [`export`]: CSV and terminal rendering of the table
//! - [`generate`]: Synthetic censored samples from an explicit RNG
//!
//! # Example
//!
//! ```
//! use fraclen_fit::{fitter::DistributionFitter, sample::CensoredSample};
//!
//! let sample = CensoredSample::new(
//!     &[0.9, 1.4, 2.1, 2.5, 3.3, 4.8, 6.0, 1.1, 1.8, 2.9],
//!     &[false, false, false, true, false, false, true, false, false, false],
//! )
//! .unwrap();
//!
//! let mut fitter = DistributionFitter::new(sample);
//! let failures = fitter.fit_all(["lognorm", "gamma", "weibull_min", "expon"]);
//! assert!(failures.is_empty());
//!
//! let best = fitter.best_fit().unwrap();
//! assert_eq!(best.criterion_rank, 1);
//! assert_eq!(best.fitted.location(), 0.0);
//! ```

pub mod distribution;
pub mod export;
pub mod family;
pub mod fitter;
pub mod generate;
pub mod metrics;
pub mod sample;
