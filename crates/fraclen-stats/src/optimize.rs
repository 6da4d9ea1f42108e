//! Derivative-free minimization with the Nelder-Mead simplex method.
//!
//! The objective may return non-finite values for points outside its domain;
//! those are treated as `+inf`, so the simplex is pushed back towards the
//! feasible region instead of propagating `NaN`.

/// Failure modes of [`nelder_mead`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum OptimizeError {
    #[display("starting point must have at least one dimension")]
    EmptyStart,
    #[display("objective is not finite at the starting point")]
    NonFiniteStart,
    #[display("no convergence after {iterations} iterations (spread {spread:e})")]
    MaxIterations { iterations: usize, spread: f64 },
}

/// Tuning knobs for [`nelder_mead`].
#[derive(Debug, Clone)]
pub struct NelderMeadOptions {
    /// Edge length of the initial simplex along each axis.
    /// Coordinates equal to zero use this value, others use `step * |x|`.
    pub initial_step: f64,
    /// Convergence threshold on the spread of objective values in the simplex.
    pub function_tolerance: f64,
    /// Convergence threshold on the largest coordinate distance to the best vertex.
    pub parameter_tolerance: f64,
    /// Iteration cap of a single simplex run.
    pub max_iterations: usize,
    /// Number of fresh simplices built around the best point after the first run.
    pub max_restarts: usize,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            function_tolerance: 1e-8,
            parameter_tolerance: 1e-6,
            max_iterations: 5000,
            max_restarts: 8,
        }
    }
}

/// Result of a successful minimization.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Location of the minimum.
    pub point: Vec<f64>,
    /// Objective value at [`Self::point`].
    pub value: f64,
    /// Number of simplex iterations performed, over all runs.
    pub iterations: usize,
}

// standard reflection/expansion/contraction/shrink coefficients
const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Minimizes `f` starting from `x0`.
///
/// A single simplex easily degenerates while crawling along a curved valley.
/// Each run therefore ends either converged or at the iteration cap, and the
/// next run starts from a fresh simplex around the best point found so far.
/// The search succeeds once a converged run no longer improves on its start
/// by more than `function_tolerance`.
///
/// # Errors
///
/// Returns [`OptimizeError`] if `x0` is empty, `f(x0)` is not finite, or the
/// last run has not converged after `options.max_restarts` restarts.
///
/// # Examples
///
/// ```
/// use fraclen_stats::optimize::{NelderMeadOptions, nelder_mead};
///
/// let rosenbrock = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
/// let min = nelder_mead(rosenbrock, &[-1.2, 1.0], &NelderMeadOptions::default()).unwrap();
/// assert!((min.point[0] - 1.0).abs() < 1e-3);
/// assert!((min.point[1] - 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    mut f: F,
    x0: &[f64],
    options: &NelderMeadOptions,
) -> Result<Minimum, OptimizeError>
where
    F: FnMut(&[f64]) -> f64,
{
    if x0.is_empty() {
        return Err(OptimizeError::EmptyStart);
    }
    let mut eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let start_value = eval(x0);
    if !start_value.is_finite() {
        return Err(OptimizeError::NonFiniteStart);
    }

    let mut point = x0.to_vec();
    let mut value = start_value;
    let mut iterations = 0;
    let mut converged = false;
    let mut spread = f64::INFINITY;
    for _ in 0..=options.max_restarts {
        let run = simplex_run(&mut eval, &point, value, options);
        iterations += run.iterations;
        let improvement = value - run.value;
        point = run.point;
        value = run.value;
        if run.converged && improvement <= options.function_tolerance {
            return Ok(Minimum {
                point,
                value,
                iterations,
            });
        }
        converged = run.converged;
        spread = run.spread;
    }

    if converged {
        Ok(Minimum {
            point,
            value,
            iterations,
        })
    } else {
        Err(OptimizeError::MaxIterations { iterations, spread })
    }
}

/// Outcome of one simplex run.
struct SimplexRun {
    point: Vec<f64>,
    value: f64,
    iterations: usize,
    converged: bool,
    /// Spread of objective values when the run stopped.
    spread: f64,
}

#[expect(clippy::cast_precision_loss)]
fn simplex_run<F>(
    eval: &mut F,
    x0: &[f64],
    start_value: f64,
    options: &NelderMeadOptions,
) -> SimplexRun
where
    F: FnMut(&[f64]) -> f64,
{
    let dim = x0.len();
    let mut simplex = Vec::with_capacity(dim + 1);
    simplex.push((x0.to_vec(), start_value));
    for i in 0..dim {
        let mut vertex = x0.to_vec();
        vertex[i] += if vertex[i].abs() < f64::EPSILON {
            options.initial_step
        } else {
            options.initial_step * vertex[i].abs()
        };
        let value = eval(&vertex);
        simplex.push((vertex, value));
    }

    for iteration in 0..options.max_iterations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let best = simplex[0].1;
        let worst = simplex[dim].1;
        let spread = simplex[1..]
            .iter()
            .flat_map(|(v, _)| v.iter().zip(&simplex[0].0).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        if (worst - best).abs() <= options.function_tolerance
            && spread <= options.parameter_tolerance
        {
            let (point, value) = simplex.swap_remove(0);
            return SimplexRun {
                point,
                value,
                iterations: iteration,
                converged: true,
                spread: worst - best,
            };
        }

        let centroid = (0..dim)
            .map(|i| simplex[..dim].iter().map(|(v, _)| v[i]).sum::<f64>() / dim as f64)
            .collect::<Vec<_>>();
        let towards = |coef: f64, from: &[f64]| {
            centroid
                .iter()
                .zip(from)
                .map(|(c, w)| c + coef * (c - w))
                .collect::<Vec<_>>()
        };

        let reflected = towards(ALPHA, &simplex[dim].0);
        let reflected_value = eval(&reflected);

        if reflected_value < best {
            let expanded = towards(GAMMA, &simplex[dim].0);
            let expanded_value = eval(&expanded);
            simplex[dim] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }
        if reflected_value < simplex[dim - 1].1 {
            simplex[dim] = (reflected, reflected_value);
            continue;
        }

        let contracted = if reflected_value < worst {
            towards(RHO, &reflected)
        } else {
            towards(-RHO, &simplex[dim].0)
        };
        let contracted_value = eval(&contracted);
        if contracted_value < worst.min(reflected_value) {
            simplex[dim] = (contracted, contracted_value);
            continue;
        }

        let anchor = simplex[0].0.clone();
        for (vertex, value) in &mut simplex[1..] {
            for (x, a) in vertex.iter_mut().zip(&anchor) {
                *x = a + SIGMA * (*x - a);
            }
            *value = eval(vertex);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let spread = (simplex[dim].1 - simplex[0].1).abs();
    let (point, value) = simplex.swap_remove(0);
    SimplexRun {
        point,
        value,
        iterations: options.max_iterations,
        converged: false,
        spread,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_quadratic_bowl() {
        let f = |x: &[f64]| (x[0] - 3.0).powi(2) + 2.0 * (x[1] + 1.0).powi(2);
        let min = nelder_mead(f, &[0.0, 0.0], &NelderMeadOptions::default()).unwrap();
        assert_abs_diff_eq!(min.point[0], 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(min.point[1], -1.0, epsilon = 1e-4);
        assert!(min.value < 1e-8);
    }

    #[test]
    fn test_one_dimensional() {
        let f = |x: &[f64]| (x[0] - 0.25).abs();
        let min = nelder_mead(f, &[4.0], &NelderMeadOptions::default()).unwrap();
        assert_abs_diff_eq!(min.point[0], 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_infeasible_region_is_avoided() {
        // ln is undefined for x <= 0; the objective returns NaN there
        let f = |x: &[f64]| x[0] - 2.0 * x[0].ln();
        let min = nelder_mead(f, &[0.5], &NelderMeadOptions::default()).unwrap();
        assert_abs_diff_eq!(min.point[0], 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_empty_start() {
        let err = nelder_mead(|_| 0.0, &[], &NelderMeadOptions::default()).unwrap_err();
        assert_eq!(err, OptimizeError::EmptyStart);
    }

    #[test]
    fn test_non_finite_start() {
        let err = nelder_mead(|x| x[0].ln(), &[-1.0], &NelderMeadOptions::default()).unwrap_err();
        assert_eq!(err, OptimizeError::NonFiniteStart);
    }

    #[test]
    fn test_iteration_cap() {
        let options = NelderMeadOptions {
            max_iterations: 3,
            max_restarts: 0,
            ..NelderMeadOptions::default()
        };
        let f = |x: &[f64]| (x[0] - 100.0).powi(2) + (x[1] - 50.0).powi(2);
        let err = nelder_mead(f, &[0.0, 0.0], &options).unwrap_err();
        assert!(matches!(err, OptimizeError::MaxIterations { iterations: 3, .. }));

        let options = NelderMeadOptions {
            max_iterations: 3,
            max_restarts: 2,
            ..NelderMeadOptions::default()
        };
        let err = nelder_mead(f, &[0.0, 0.0], &options).unwrap_err();
        assert!(matches!(err, OptimizeError::MaxIterations { iterations: 9, .. }));
    }

    #[test]
    fn test_converged_run_is_confirmed_by_a_restart() {
        let f = |x: &[f64]| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2);
        let min = nelder_mead(f, &[0.0, 0.0], &NelderMeadOptions::default()).unwrap();
        let single = NelderMeadOptions {
            max_restarts: 0,
            ..NelderMeadOptions::default()
        };
        let first = nelder_mead(f, &[0.0, 0.0], &single).unwrap();
        assert!(min.iterations > first.iterations);
        assert!(min.value <= first.value);
    }
}
