//! Statistical building blocks for fracture length analysis.
//!
//! This crate provides the numerical pieces the fitting engine is built on:
//!
//! - **Descriptive statistics**: mean, median, mode, variance, standard deviation
//! - **Percentiles**: linearly interpolated percentile values
//! - **Survival analysis**: Kaplan-Meier product-limit estimator for right-censored data
//! - **Optimization**: Nelder-Mead simplex minimizer used for maximum-likelihood fits
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`survival`]: Kaplan-Meier empirical CDF for censored data
//! - [`optimize`]: Derivative-free minimization
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use fraclen_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Estimating a CDF from censored lengths
//!
//! ```
//! use fraclen_stats::survival::kaplan_meier;
//!
//! // (length, is_censored)
//! let lengths = [1.5, 2.0, 4.0, 7.5];
//! let censored = [false, true, false, false];
//! let curve = kaplan_meier(&lengths, &lengths, &censored);
//! assert_eq!(curve.probabilities()[0], 0.25);
//! assert_eq!(curve.probabilities()[3], 1.0);
//! ```

pub mod descriptive;
pub mod optimize;
pub mod percentiles;
pub mod survival;
